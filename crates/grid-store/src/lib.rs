//! Persistence layer for gridded resource inputs and outputs.
//!
//! Weather fields are `[rows, cols, hours]` float32 Zarr V3 arrays and
//! static rasters are `[rows, cols]` arrays, one array per directory:
//!
//! ```text
//! <root>/
//! ├── weather/CLEARNESS.zarr   [rows, cols, 8760]
//! ├── weather/T2M.zarr
//! ├── weather/W50M.zarr
//! ├── raw/SWGDN.zarr           [rows, cols, raw hours]
//! ├── rasters/landuse.zarr     [rows, cols]
//! ├── rasters/land.zarr
//! └── flh/<tech>/<region>.zarr
//! ```
//!
//! Every array carries its geographic `window` (north, east, south, west)
//! and `resolution` (lat, lon) as attributes.
//!
//! Consumers read through the [`WeatherStore`] and [`RasterStore`] traits;
//! [`ZarrStore`] backs them with the filesystem and [`MemoryStore`] with
//! in-memory maps for tests.

pub mod config;
pub mod error;
pub mod store;
pub mod weather;
pub mod writer;

pub use config::{StoreConfig, ZarrCompression};
pub use error::{Result, StoreError};
pub use store::{GridSpec, MemoryStore, RasterLayer, RasterStore, WeatherField, WeatherStore, ZarrStore};
pub use writer::{ArrayMetadata, ZarrWriter};
