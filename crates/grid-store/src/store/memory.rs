//! In-memory store for tests and small synthetic runs.

use std::collections::HashMap;

use geo_common::{HourlyField, Raster, ResourceError, Result};
use grid_index::IndexQuad;

use super::{GridSpec, RasterLayer, RasterStore, WeatherField, WeatherStore};

/// Weather fields and rasters held in maps.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    weather_grid: GridSpec,
    raster_grid: GridSpec,
    fields: HashMap<WeatherField, HourlyField>,
    rasters: HashMap<RasterLayer, Raster<f32>>,
}

impl MemoryStore {
    pub fn new(weather_grid: GridSpec, raster_grid: GridSpec) -> Self {
        Self {
            weather_grid,
            raster_grid,
            fields: HashMap::new(),
            rasters: HashMap::new(),
        }
    }

    /// Add a weather field; it must match the weather grid shape.
    pub fn with_field(mut self, field: WeatherField, data: HourlyField) -> Result<Self> {
        let (rows, cols) = self.weather_grid.shape();
        if (data.rows(), data.cols()) != (rows, cols) {
            return Err(ResourceError::missing_data(format!(
                "{} is {}x{}, weather grid is {}x{}",
                field,
                data.rows(),
                data.cols(),
                rows,
                cols
            )));
        }
        self.fields.insert(field, data);
        Ok(self)
    }

    /// Add a static raster; it must match the output grid shape.
    pub fn with_raster(mut self, layer: RasterLayer, data: Raster<f32>) -> Result<Self> {
        let (rows, cols) = self.raster_grid.shape();
        data.ensure_shape(rows, cols, layer.as_str())?;
        self.rasters.insert(layer, data);
        Ok(self)
    }
}

impl WeatherStore for MemoryStore {
    fn weather_grid(&self) -> Result<GridSpec> {
        Ok(self.weather_grid)
    }

    fn read_field(&self, field: WeatherField, quad: Option<&IndexQuad>) -> Result<HourlyField> {
        let data = self
            .fields
            .get(&field)
            .ok_or_else(|| ResourceError::missing_data(format!("weather field {} not in store", field)))?;
        match quad {
            None => Ok(data.clone()),
            Some(q) => {
                q.ensure_within(data.rows(), data.cols())?;
                data.subset(q.row_range(), q.col_range())
            }
        }
    }
}

impl RasterStore for MemoryStore {
    fn raster_grid(&self) -> Result<GridSpec> {
        Ok(self.raster_grid)
    }

    fn read_raster(&self, layer: RasterLayer, quad: Option<&IndexQuad>) -> Result<Raster<f32>> {
        let data = self
            .rasters
            .get(&layer)
            .ok_or_else(|| ResourceError::missing_data(format!("raster {} not in store", layer)))?;
        match quad {
            None => Ok(data.clone()),
            Some(q) => {
                q.ensure_within(data.rows(), data.cols())?;
                data.subset(q.row_range(), q.col_range())
            }
        }
    }
}
