//! Full-load-hour engine.
//!
//! Turns prepared weather fields and static rasters into annual full-load
//! hours (the sum of hourly capacity factors) per pixel and an hourly mean
//! capacity factor per region.
//!
//! # Flow
//!
//! ```text
//! RegionDriver::compute_flh(technology, region)
//!   Loading      locate region, slice stores, rasterize mask -> RegionInputs
//!   Dispatching  filter dark hours (solar), split into nproc chunks
//!   Computing    HourChunkJob -> run_chunk on a rayon pool
//!   Merging      sum FLH, copy series values at their hours
//!   Done         zero-sum pixels -> NaN
//! ```

pub mod aggregate;
pub mod config;
pub mod correction;
pub mod inputs;
pub mod job;
pub mod partition;
pub mod rasterize;
pub mod region;
pub mod series;
pub mod worker;

pub use aggregate::{Aggregate, AggregationEngine};
pub use config::{EngineConfig, ModelParams};
pub use correction::{build_wind_correction, fit_gwa_correction, GwaCountry};
pub use inputs::{ModelInputs, RegionInputs};
pub use job::{AggregationJob, HourChunkJob, JobState};
pub use rasterize::{PixelCenterRasterizer, RegionRasterizer};
pub use region::{PointSeries, Polygon, Region, RegionDriver, RegionFlh, RegionWindows};
pub use series::HourlySeries;
