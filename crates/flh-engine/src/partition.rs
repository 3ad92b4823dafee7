//! Hour selection and chunking.

use geo_common::{HourlyField, HOURS_PER_YEAR};

use crate::inputs::RegionInputs;

/// Split `hours` into at most `parts` contiguous, near-equal chunks.
///
/// The first `len % parts` chunks are one element longer. Empty chunks are
/// not returned.
pub fn array_split(hours: &[usize], parts: usize) -> Vec<Vec<usize>> {
    let parts = parts.max(1);
    let base = hours.len() / parts;
    let extra = hours.len() % parts;

    let mut chunks = Vec::with_capacity(parts.min(hours.len()));
    let mut start = 0;
    for i in 0..parts {
        let len = base + usize::from(i < extra);
        if len == 0 {
            break;
        }
        chunks.push(hours[start..start + len].to_vec());
        start += len;
    }
    chunks
}

/// Hours whose clearness, summed over the field, is nonzero.
pub fn daylight_hours(clearness: &HourlyField) -> Vec<usize> {
    (0..clearness.hours().min(HOURS_PER_YEAR))
        .filter(|&h| clearness.hour_sum(h) != 0.0)
        .collect()
}

/// Hours a job has to evaluate: every hour for wind, daylight hours for
/// solar technologies.
pub fn dispatch_hours(inputs: &RegionInputs) -> Vec<usize> {
    match inputs.model().clearness() {
        Some(clearness) => daylight_hours(clearness),
        None => (0..HOURS_PER_YEAR).collect(),
    }
}
