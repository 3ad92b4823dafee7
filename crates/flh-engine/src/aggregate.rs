//! Fan-out of hour chunks onto a worker pool and deterministic merge.

use std::sync::Arc;

use geo_common::{ResourceError, Result};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::inputs::RegionInputs;
use crate::job::{AggregationJob, HourChunkJob, JobState};
use crate::partition::array_split;
use crate::series::HourlySeries;
use crate::worker::{run_chunk, ChunkResult};

/// Merged output of all workers of one job.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    /// Summed masked capacity factors per output pixel, row-major.
    pub flh: Vec<f64>,
    /// Regional mean capacity factor per hour.
    pub series: HourlySeries,
    /// Number of hours evaluated.
    pub hours: usize,
}

impl Aggregate {
    fn empty(len: usize) -> Self {
        Self {
            flh: vec![0.0; len],
            series: HourlySeries::zeros(),
            hours: 0,
        }
    }

    /// Add one worker's partial result.
    pub fn merge(&mut self, part: &ChunkResult) {
        for (acc, v) in self.flh.iter_mut().zip(&part.flh) {
            *acc += v;
        }
        self.series.copy_hours(&part.series, &part.hours);
        self.hours += part.hours.len();
    }
}

/// A worker pool dedicated to one technology run.
pub struct AggregationEngine {
    pool: rayon::ThreadPool,
    workers: usize,
}

impl AggregationEngine {
    /// Build a pool of `workers` threads.
    pub fn new(workers: usize) -> Result<Self> {
        let workers = workers.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("flh-worker-{}", i))
            .build()
            .map_err(|e| ResourceError::config(format!("failed to build worker pool: {}", e)))?;
        Ok(Self { pool, workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Evaluate `hours` over `inputs` and merge the partial results.
    ///
    /// `job` must be in the `Dispatching` state and ends in `Done`. If any
    /// worker fails the whole job fails with [`ResourceError::WorkerFailure`]
    /// and no partial result is returned.
    pub fn run(
        &self,
        job: &mut AggregationJob,
        inputs: Arc<RegionInputs>,
        hours: &[usize],
    ) -> Result<Aggregate> {
        if job.state() != JobState::Dispatching {
            return Err(ResourceError::config(format!(
                "job for '{}' is {}, expected dispatching",
                job.region,
                job.state()
            )));
        }

        let chunks: Vec<HourChunkJob> = array_split(hours, self.workers)
            .into_iter()
            .map(|hours| HourChunkJob {
                region_id: job.region.clone(),
                technology: job.technology,
                hours,
                inputs: Arc::clone(&inputs),
            })
            .collect();
        debug!(
            region = %job.region,
            technology = %job.technology,
            hours = hours.len(),
            chunks = chunks.len(),
            "Dispatched hour chunks"
        );

        job.advance();
        let results: Vec<(HourChunkJob, Result<ChunkResult>)> = self.pool.install(|| {
            chunks
                .into_par_iter()
                .map(|chunk| {
                    let outcome = run_chunk(chunk.clone());
                    (chunk, outcome)
                })
                .collect()
        });

        job.advance();
        let mut aggregate = Aggregate::empty(inputs.len());
        for (chunk, outcome) in results {
            match outcome {
                Ok(part) => aggregate.merge(&part),
                Err(source) => {
                    return Err(ResourceError::worker_failure(
                        job.technology,
                        job.region.clone(),
                        chunk.span(),
                        source,
                    ))
                }
            }
        }

        job.advance();
        info!(
            region = %job.region,
            technology = %job.technology,
            hours = aggregate.hours,
            workers = self.workers,
            "Aggregation complete"
        );
        Ok(aggregate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::ModelInputs;
    use geo_common::{HourlyField, Raster, Technology, HOURS_PER_YEAR};
    use resource_model::{PowerCurve, TurbineParams};

    fn inputs() -> Arc<RegionInputs> {
        // Wind speed ramps through the curve so hours differ.
        let model = ModelInputs::Wind {
            technology: Technology::WindOff,
            wind_speed: HourlyField::from_fn(1, 2, HOURS_PER_YEAR, |_, c, h| {
                (h % 40) as f32 + c as f32
            }),
            correction: Raster::from_fn(2, 2, |r, c| 1.0 + 0.1 * (r + c) as f32),
            curve: PowerCurve::new(&TurbineParams::offshore()).unwrap(),
        };
        let mask = Raster::new(2, 2, vec![1, 1, 0, 1]).unwrap();
        Arc::new(RegionInputs::new(mask, vec![0, 1, 0, 1], model).unwrap())
    }

    fn dispatching(region: &str) -> AggregationJob {
        let mut job = AggregationJob::new(region, Technology::WindOff);
        job.advance();
        job
    }

    #[test]
    fn test_result_independent_of_worker_count() {
        let hours: Vec<usize> = (0..HOURS_PER_YEAR).collect();
        let single = AggregationEngine::new(1)
            .unwrap()
            .run(&mut dispatching("r"), inputs(), &hours)
            .unwrap();
        let mut job = dispatching("r");
        let many = AggregationEngine::new(7).unwrap().run(&mut job, inputs(), &hours).unwrap();

        assert_eq!(job.state(), JobState::Done);
        assert_eq!(single.hours, HOURS_PER_YEAR);
        assert_eq!(many.series, single.series);
        for (a, b) in single.flh.iter().zip(&many.flh) {
            assert!((a - b).abs() < 1e-6, "{} vs {}", a, b);
        }
        assert_eq!(many.flh[2], 0.0);
    }

    fn chunk(hours: Vec<usize>) -> ChunkResult {
        run_chunk(HourChunkJob {
            region_id: "r".to_string(),
            technology: Technology::WindOff,
            hours,
            inputs: inputs(),
        })
        .unwrap()
    }

    #[test]
    fn test_merge_of_interleaved_chunks_matches_single_pass() {
        let even: Vec<usize> = (0..HOURS_PER_YEAR).step_by(2).collect();
        let odd: Vec<usize> = (1..HOURS_PER_YEAR).step_by(2).collect();
        let (even, odd) = (chunk(even), chunk(odd));

        let mut whole = Aggregate::empty(4);
        whole.merge(&chunk((0..HOURS_PER_YEAR).collect()));

        let mut split = Aggregate::empty(4);
        split.merge(&odd);
        split.merge(&even);
        let mut reversed = Aggregate::empty(4);
        reversed.merge(&even);
        reversed.merge(&odd);

        assert_eq!(split.hours, HOURS_PER_YEAR);
        assert_eq!(split.series, whole.series);
        assert_eq!(reversed.series, whole.series);
        for i in 0..4 {
            assert!((split.flh[i] - whole.flh[i]).abs() < 1e-6, "pixel {}", i);
            assert!((split.flh[i] - reversed.flh[i]).abs() < 1e-9, "pixel {}", i);
        }
        assert!(whole.flh[0] > 0.0);
    }

    #[test]
    fn test_worker_failure_aborts_job() {
        let hours = vec![1, 2, 3, HOURS_PER_YEAR + 5];
        let err = AggregationEngine::new(2)
            .unwrap()
            .run(&mut dispatching("Bremen"), inputs(), &hours)
            .unwrap_err();
        match err {
            ResourceError::WorkerFailure {
                technology,
                region,
                hours,
                source,
            } => {
                assert_eq!(technology, Technology::WindOff);
                assert_eq!(region, "Bremen");
                assert_eq!(hours.last, HOURS_PER_YEAR + 5);
                assert!(matches!(*source, ResourceError::MissingData(_)));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_run_requires_dispatching_state() {
        let mut job = AggregationJob::new("r", Technology::WindOff);
        let engine = AggregationEngine::new(1).unwrap();
        assert!(engine.run(&mut job, inputs(), &[0]).is_err());
    }
}
