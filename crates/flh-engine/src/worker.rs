//! Hour loop run by one worker.

use geo_common::Result;
use tracing::debug;

use crate::job::HourChunkJob;
use crate::series::HourlySeries;

/// What one worker hands back to the parent.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkResult {
    /// Hours this worker processed.
    pub hours: Vec<usize>,
    /// Sum of masked capacity factors per output pixel, row-major.
    pub flh: Vec<f64>,
    /// Regional mean capacity factor, set only at `hours`.
    pub series: HourlySeries,
}

/// Evaluate every hour of a chunk into private accumulators.
///
/// Per hour the capacity factor is multiplied by the mask and non-finite
/// values are zeroed before accumulation. The series value is the mean over
/// mask pixels, 0 for an empty mask.
pub fn run_chunk(job: HourChunkJob) -> Result<ChunkResult> {
    let inputs = &job.inputs;
    let n = inputs.len();
    let mask = inputs.mask().data();
    let mask_count = inputs.mask_count();

    let mut flh = vec![0.0f64; n];
    let mut series = HourlySeries::zeros();
    let mut cf = vec![0.0f64; n];

    for &hour in &job.hours {
        inputs.capacity_factors(hour, &mut cf)?;

        let mut inside = 0.0;
        for i in 0..n {
            let v = cf[i] * mask[i] as f64;
            let v = if v.is_finite() { v } else { 0.0 };
            flh[i] += v;
            if mask[i] == 1 {
                inside += v;
            }
        }
        let mean = if mask_count > 0 {
            inside / mask_count as f64
        } else {
            0.0
        };
        series.set(hour, mean);
    }

    debug!(
        region = %job.region_id,
        technology = %job.technology,
        hours = job.hours.len(),
        "Worker finished chunk"
    );
    Ok(ChunkResult {
        hours: job.hours,
        flh,
        series,
    })
}
