//! Zarr V3 writer for rasters and hourly fields.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use geo_common::{HourlyField, Raster};
use serde::{Deserialize, Serialize};
use tracing::debug;
use zarrs::array::codec::bytes_to_bytes::blosc::{
    BloscCodec, BloscCompressionLevel, BloscCompressor, BloscShuffleMode,
};
use zarrs::array::{Array, ArrayBuilder, DataType, FillValue};
use zarrs::array_subset::ArraySubset;
use zarrs::storage::{ReadableStorageTraits, WritableStorageTraits};

use crate::config::{StoreConfig, ZarrCompression};
use crate::error::{Result, StoreError};
use crate::store::GridSpec;

/// Description of a written array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayMetadata {
    /// Array name.
    pub name: String,
    /// Array shape, `[rows, cols]` or `[rows, cols, hours]`.
    pub shape: Vec<u64>,
    /// Chunk shape.
    pub chunk_shape: Vec<u64>,
    /// Geographic extent and resolution.
    pub grid: GridSpec,
    /// Physical units.
    pub units: String,
    /// Compression codec used.
    pub compression: String,
    /// When the array was written.
    pub written_at: DateTime<Utc>,
}

impl ArrayMetadata {
    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Deserialize from JSON.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value.clone())?)
    }
}

/// Writer for float32 Zarr V3 arrays carrying grid attributes.
#[derive(Debug, Clone)]
pub struct ZarrWriter {
    config: StoreConfig,
}

impl ZarrWriter {
    /// Create a new ZarrWriter with the given configuration.
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    /// Write a `[rows, cols]` raster.
    ///
    /// # Arguments
    /// * `storage` - Storage backend (must be readable AND writable)
    /// * `path` - Array path inside the storage (e.g. "/")
    /// * `raster` - Row-major data, north row first
    /// * `grid` - Extent and resolution of the raster
    /// * `name` - Array name stored in the attributes
    /// * `units` - Physical units
    pub fn write_raster<S: ReadableStorageTraits + WritableStorageTraits + 'static>(
        &self,
        storage: S,
        path: &str,
        raster: &Raster<f32>,
        grid: &GridSpec,
        name: &str,
        units: &str,
    ) -> Result<ArrayMetadata> {
        let (rows, cols) = raster.shape();
        let shape = vec![rows as u64, cols as u64];
        let chunk_shape = vec![
            self.spatial_chunk(rows),
            self.spatial_chunk(cols),
        ];
        self.write_array(
            Arc::new(storage),
            path,
            shape,
            chunk_shape,
            raster.data(),
            grid,
            name,
            units,
            None,
        )
    }

    /// Write a `[rows, cols, hours]` field.
    pub fn write_hourly_field<S: ReadableStorageTraits + WritableStorageTraits + 'static>(
        &self,
        storage: S,
        path: &str,
        field: &HourlyField,
        grid: &GridSpec,
        name: &str,
        units: &str,
    ) -> Result<ArrayMetadata> {
        let shape = vec![field.rows() as u64, field.cols() as u64, field.hours() as u64];
        let chunk_shape = vec![
            self.spatial_chunk(field.rows()),
            self.spatial_chunk(field.cols()),
            (self.config.hour_chunk.min(field.hours()).max(1)) as u64,
        ];
        self.write_array(
            Arc::new(storage),
            path,
            shape,
            chunk_shape,
            &field.to_row_major(),
            grid,
            name,
            units,
            Some(field.hours()),
        )
    }

    fn spatial_chunk(&self, len: usize) -> u64 {
        self.config.chunk_size.min(len).max(1) as u64
    }

    #[allow(clippy::too_many_arguments)]
    fn write_array<S: ReadableStorageTraits + WritableStorageTraits + 'static>(
        &self,
        store: Arc<S>,
        path: &str,
        shape: Vec<u64>,
        chunk_shape: Vec<u64>,
        data: &[f32],
        grid: &GridSpec,
        name: &str,
        units: &str,
        hours: Option<usize>,
    ) -> Result<ArrayMetadata> {
        let mut attrs = serde_json::Map::new();
        attrs.insert("name".to_string(), serde_json::json!(name));
        attrs.insert("units".to_string(), serde_json::json!(units));
        if let Some(hours) = hours {
            attrs.insert("hours".to_string(), serde_json::json!(hours));
        }
        grid.to_attributes(&mut attrs);

        let array = self.build_array(store, path, shape.clone(), chunk_shape.clone(), attrs)?;

        array
            .store_metadata()
            .map_err(|e| StoreError::write_failed(e.to_string()))?;

        let subset = ArraySubset::new_with_start_shape(vec![0; shape.len()], shape.clone())
            .map_err(|e| StoreError::write_failed(e.to_string()))?;

        array
            .store_array_subset_elements(&subset, data)
            .map_err(|e| StoreError::write_failed(e.to_string()))?;

        debug!(name, shape = ?shape, compression = %self.config.compression, "Wrote Zarr array");

        Ok(ArrayMetadata {
            name: name.to_string(),
            shape,
            chunk_shape,
            grid: *grid,
            units: units.to_string(),
            compression: self.config.compression.as_str().to_string(),
            written_at: Utc::now(),
        })
    }

    /// Build a Zarr array with the configured settings.
    fn build_array<S: ReadableStorageTraits + WritableStorageTraits + 'static>(
        &self,
        storage: Arc<S>,
        path: &str,
        shape: Vec<u64>,
        chunk_shape: Vec<u64>,
        attrs: serde_json::Map<String, serde_json::Value>,
    ) -> Result<Array<S>> {
        let chunk_grid: zarrs::array::ChunkGrid = chunk_shape
            .try_into()
            .map_err(|e| StoreError::ConfigError(format!("{:?}", e)))?;

        let mut binding = ArrayBuilder::new(
            shape,
            DataType::Float32,
            chunk_grid,
            FillValue::from(f32::NAN),
        );
        let mut builder = binding.attributes(attrs);

        if self.config.compression != ZarrCompression::None {
            let codec = self.create_compression_codec()?;
            builder = builder.bytes_to_bytes_codecs(vec![codec]);
        }

        builder
            .build(storage, path)
            .map_err(|e| StoreError::write_failed(e.to_string()))
    }

    /// Create the compression codec based on configuration.
    fn create_compression_codec(
        &self,
    ) -> Result<Arc<dyn zarrs::array::codec::BytesToBytesCodecTraits>> {
        let level = BloscCompressionLevel::try_from(self.config.compression_level)
            .map_err(|_| StoreError::ConfigError("invalid compression level".to_string()))?;

        let (shuffle, typesize) = if self.config.shuffle {
            (BloscShuffleMode::Shuffle, Some(std::mem::size_of::<f32>()))
        } else {
            (BloscShuffleMode::NoShuffle, None)
        };

        let compressor = match self.config.compression {
            ZarrCompression::None => {
                return Err(StoreError::ConfigError(
                    "no compression configured".to_string(),
                ))
            }
            ZarrCompression::BloscLz4 => BloscCompressor::LZ4,
            ZarrCompression::BloscZstd => BloscCompressor::Zstd,
        };

        let codec = BloscCodec::new(compressor, level, None, shuffle, typesize)
            .map_err(|e| StoreError::ConfigError(e.to_string()))?;

        Ok(Arc::new(codec))
    }
}
