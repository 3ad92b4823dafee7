//! Aggregation job lifecycle and the per-worker job descriptor.

use std::sync::Arc;

use geo_common::{HourSpan, Technology};
use tracing::debug;

use crate::inputs::RegionInputs;

/// Stage of a (technology, region) aggregation job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum JobState {
    /// Region-local weather slices and rasters are being read.
    Loading,
    /// The hour list is being filtered and split into chunks.
    Dispatching,
    /// Workers are running.
    Computing,
    /// Partial results are being combined.
    Merging,
    /// Results are final.
    Done,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Dispatching => "dispatching",
            Self::Computing => "computing",
            Self::Merging => "merging",
            Self::Done => "done",
        }
    }

    /// The state that follows this one, if any.
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Loading => Some(Self::Dispatching),
            Self::Dispatching => Some(Self::Computing),
            Self::Computing => Some(Self::Merging),
            Self::Merging => Some(Self::Done),
            Self::Done => None,
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tracks the state of one (technology, region) job.
#[derive(Debug, Clone)]
pub struct AggregationJob {
    pub region: String,
    pub technology: Technology,
    state: JobState,
}

impl AggregationJob {
    /// A new job in the `Loading` state.
    pub fn new(region: impl Into<String>, technology: Technology) -> Self {
        let job = Self {
            region: region.into(),
            technology,
            state: JobState::Loading,
        };
        debug!(region = %job.region, technology = %technology, state = %job.state, "Job created");
        job
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// Move to the next state. Advancing past `Done` is a no-op.
    pub fn advance(&mut self) -> JobState {
        if let Some(next) = self.state.next() {
            debug!(
                region = %self.region,
                technology = %self.technology,
                from = %self.state,
                to = %next,
                "Job state transition"
            );
            self.state = next;
        }
        self.state
    }
}

/// Work handed to one worker: a set of hours over shared region inputs.
#[derive(Debug, Clone)]
pub struct HourChunkJob {
    pub region_id: String,
    pub technology: Technology,
    /// Hour-of-year indices, ascending.
    pub hours: Vec<usize>,
    pub inputs: Arc<RegionInputs>,
}

impl HourChunkJob {
    /// Describe the hours for error reporting.
    pub fn span(&self) -> HourSpan {
        HourSpan::from_hours(&self.hours).unwrap_or(HourSpan::new(0, 0, 0))
    }
}
