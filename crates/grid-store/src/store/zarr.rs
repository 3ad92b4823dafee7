//! Filesystem-backed Zarr V3 store.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use geo_common::{HourlyField, Raster};
use grid_index::IndexQuad;
use tracing::{debug, info};
use zarrs::array::Array;
use zarrs::array_subset::ArraySubset;
use zarrs_filesystem::FilesystemStore;

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::writer::{ArrayMetadata, ZarrWriter};

use super::{GridSpec, RasterLayer, RasterStore, WeatherField, WeatherStore};

/// Prepared weather fields.
pub const WEATHER_GROUP: &str = "weather";
/// Weather fields as downloaded, before preparation.
pub const RAW_GROUP: &str = "raw";
/// Static rasters.
pub const RASTER_GROUP: &str = "rasters";
/// Annual full-load-hour outputs.
pub const FLH_GROUP: &str = "flh";

/// Store of one-array-per-directory Zarr V3 arrays under a root directory.
#[derive(Debug, Clone)]
pub struct ZarrStore {
    config: StoreConfig,
}

impl ZarrStore {
    /// Open a store; the root directory is created if missing.
    pub fn open(config: StoreConfig) -> Result<Self> {
        config.validate().map_err(StoreError::ConfigError)?;
        std::fs::create_dir_all(&config.root)?;
        info!(root = %config.root.display(), compression = %config.compression, "Opened Zarr store");
        Ok(Self { config })
    }

    pub fn root(&self) -> &Path {
        &self.config.root
    }

    pub fn writer(&self) -> ZarrWriter {
        ZarrWriter::new(self.config.clone())
    }

    /// Directory of the array `name` in `group`.
    pub fn array_dir(&self, group: &str, name: &str) -> PathBuf {
        self.config.root.join(group).join(format!("{}.zarr", name))
    }

    /// Whether the array exists.
    pub fn contains(&self, group: &str, name: &str) -> bool {
        self.array_dir(group, name).join("zarr.json").exists()
    }

    fn open_array(&self, group: &str, name: &str) -> Result<Array<FilesystemStore>> {
        let dir = self.array_dir(group, name);
        if !dir.join("zarr.json").exists() {
            return Err(StoreError::NotFound(format!("{}/{}", group, name)));
        }
        let store = FilesystemStore::new(&dir).map_err(|e| StoreError::open_failed(e.to_string()))?;
        Array::open(Arc::new(store), "/").map_err(|e| StoreError::open_failed(e.to_string()))
    }

    fn create_store(&self, group: &str, name: &str) -> Result<FilesystemStore> {
        let dir = self.array_dir(group, name);
        if dir.exists() {
            std::fs::remove_dir_all(&dir)?;
        }
        std::fs::create_dir_all(&dir)?;
        FilesystemStore::new(&dir).map_err(|e| StoreError::open_failed(e.to_string()))
    }

    /// Extent and resolution stored on an array.
    pub fn grid_of(&self, group: &str, name: &str) -> Result<GridSpec> {
        let array = self.open_array(group, name)?;
        GridSpec::from_attributes(array.attributes()).ok_or_else(|| {
            StoreError::invalid_metadata(format!("{}/{} has no window/resolution", group, name))
        })
    }

    /// Read a `[rows, cols, hours]` array, optionally restricted to `quad`.
    pub fn read_hourly(&self, group: &str, name: &str, quad: Option<&IndexQuad>) -> Result<HourlyField> {
        let array = self.open_array(group, name)?;
        let shape = array.shape().to_vec();
        if shape.len() != 3 {
            return Err(StoreError::invalid_metadata(format!(
                "{}/{} has {} dimensions, expected 3",
                group,
                name,
                shape.len()
            )));
        }
        let (rows, cols, hours) = (shape[0] as usize, shape[1] as usize, shape[2] as usize);
        let (row_range, col_range) = window_ranges(quad, rows, cols)?;

        let subset = ArraySubset::new_with_start_shape(
            vec![row_range.start as u64, col_range.start as u64, 0],
            vec![row_range.len() as u64, col_range.len() as u64, hours as u64],
        )
        .map_err(|e| StoreError::read_failed(e.to_string()))?;

        let data: Vec<f32> = array
            .retrieve_array_subset_elements(&subset)
            .map_err(|e| StoreError::read_failed(e.to_string()))?;

        debug!(group, name, rows = row_range.len(), cols = col_range.len(), hours, "Read hourly field");
        HourlyField::from_row_major(row_range.len(), col_range.len(), hours, &data)
            .map_err(|e| StoreError::read_failed(e.to_string()))
    }

    /// Read a `[rows, cols]` array, optionally restricted to `quad`.
    pub fn read_raster_array(&self, group: &str, name: &str, quad: Option<&IndexQuad>) -> Result<Raster<f32>> {
        let array = self.open_array(group, name)?;
        let shape = array.shape().to_vec();
        if shape.len() != 2 {
            return Err(StoreError::invalid_metadata(format!(
                "{}/{} has {} dimensions, expected 2",
                group,
                name,
                shape.len()
            )));
        }
        let (row_range, col_range) = window_ranges(quad, shape[0] as usize, shape[1] as usize)?;

        let subset = ArraySubset::new_with_start_shape(
            vec![row_range.start as u64, col_range.start as u64],
            vec![row_range.len() as u64, col_range.len() as u64],
        )
        .map_err(|e| StoreError::read_failed(e.to_string()))?;

        let data: Vec<f32> = array
            .retrieve_array_subset_elements(&subset)
            .map_err(|e| StoreError::read_failed(e.to_string()))?;

        Raster::new(row_range.len(), col_range.len(), data)
            .map_err(|e| StoreError::read_failed(e.to_string()))
    }

    /// Write an hourly field, replacing any existing array.
    pub fn write_hourly(
        &self,
        group: &str,
        name: &str,
        field: &HourlyField,
        grid: &GridSpec,
        units: &str,
    ) -> Result<ArrayMetadata> {
        let store = self.create_store(group, name)?;
        self.writer().write_hourly_field(store, "/", field, grid, name, units)
    }

    /// Write a raster, replacing any existing array.
    pub fn write_raster(
        &self,
        group: &str,
        name: &str,
        raster: &Raster<f32>,
        grid: &GridSpec,
        units: &str,
    ) -> Result<ArrayMetadata> {
        let store = self.create_store(group, name)?;
        self.writer().write_raster(store, "/", raster, grid, name, units)
    }

    /// Write a prepared weather field.
    pub fn write_field(&self, field: WeatherField, data: &HourlyField, grid: &GridSpec) -> Result<ArrayMetadata> {
        self.write_hourly(WEATHER_GROUP, field.as_str(), data, grid, field.units())
    }

    /// Write a static raster.
    pub fn write_layer(&self, layer: RasterLayer, data: &Raster<f32>, grid: &GridSpec) -> Result<ArrayMetadata> {
        self.write_raster(RASTER_GROUP, layer.as_str(), data, grid, "1")
    }
}

/// 0-based row and column ranges selected by `quad` within a parent.
fn window_ranges(
    quad: Option<&IndexQuad>,
    rows: usize,
    cols: usize,
) -> Result<(std::ops::Range<usize>, std::ops::Range<usize>)> {
    match quad {
        None => Ok((0..rows, 0..cols)),
        Some(q) => {
            q.ensure_within(rows, cols)
                .map_err(|e| StoreError::read_failed(e.to_string()))?;
            Ok((q.row_range(), q.col_range()))
        }
    }
}

impl WeatherStore for ZarrStore {
    fn weather_grid(&self) -> geo_common::Result<GridSpec> {
        Ok(self.grid_of(WEATHER_GROUP, WeatherField::Clearness.as_str())?)
    }

    fn read_field(&self, field: WeatherField, quad: Option<&IndexQuad>) -> geo_common::Result<HourlyField> {
        Ok(self.read_hourly(WEATHER_GROUP, field.as_str(), quad)?)
    }
}

impl RasterStore for ZarrStore {
    fn raster_grid(&self) -> geo_common::Result<GridSpec> {
        Ok(self.grid_of(RASTER_GROUP, RasterLayer::Landuse.as_str())?)
    }

    fn read_raster(&self, layer: RasterLayer, quad: Option<&IndexQuad>) -> geo_common::Result<Raster<f32>> {
        Ok(self.read_raster_array(RASTER_GROUP, layer.as_str(), quad)?)
    }
}
