//! Read interfaces for weather fields and static rasters.

mod memory;
mod zarr;

pub use memory::MemoryStore;
pub use zarr::{ZarrStore, FLH_GROUP, RASTER_GROUP, RAW_GROUP, WEATHER_GROUP};

use geo_common::{GeoWindow, HourlyField, Raster, Resolution, Result};
use grid_index::IndexQuad;
use serde::{Deserialize, Serialize};

/// Extent and resolution of a stored grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub window: GeoWindow,
    pub res: Resolution,
}

impl GridSpec {
    pub fn new(window: GeoWindow, res: Resolution) -> Self {
        Self { window, res }
    }

    /// (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.window.pixel_shape(&self.res)
    }

    /// Write `window` and `resolution` attributes.
    pub fn to_attributes(&self, attrs: &mut serde_json::Map<String, serde_json::Value>) {
        attrs.insert(
            "window".to_string(),
            serde_json::json!(self.window.to_attribute()),
        );
        attrs.insert(
            "resolution".to_string(),
            serde_json::json!([self.res.lat, self.res.lon]),
        );
    }

    /// Parse `window` and `resolution` attributes.
    pub fn from_attributes(attrs: &serde_json::Map<String, serde_json::Value>) -> Option<Self> {
        let floats = |key: &str| -> Option<Vec<f64>> {
            attrs
                .get(key)?
                .as_array()?
                .iter()
                .map(|v| v.as_f64())
                .collect()
        };
        let window = GeoWindow::from_attribute(&floats("window")?)?;
        let res = floats("resolution")?;
        if res.len() != 2 {
            return None;
        }
        Some(Self::new(window, Resolution::new(res[0], res[1])))
    }
}

/// Prepared hourly weather quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeatherField {
    /// Clearness index (ground / top-of-atmosphere shortwave).
    #[serde(rename = "CLEARNESS")]
    Clearness,
    /// Air temperature at 2 m (K).
    #[serde(rename = "T2M")]
    Temperature,
    /// Wind speed at 50 m (m/s).
    #[serde(rename = "W50M")]
    WindSpeed,
}

impl WeatherField {
    pub const ALL: [WeatherField; 3] = [Self::Clearness, Self::Temperature, Self::WindSpeed];

    /// Parse from string (case-insensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "CLEARNESS" => Some(Self::Clearness),
            "T2M" => Some(Self::Temperature),
            "W50M" => Some(Self::WindSpeed),
            _ => None,
        }
    }

    /// Array name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clearness => "CLEARNESS",
            Self::Temperature => "T2M",
            Self::WindSpeed => "W50M",
        }
    }

    pub fn units(&self) -> &'static str {
        match self {
            Self::Clearness => "1",
            Self::Temperature => "K",
            Self::WindSpeed => "m s-1",
        }
    }
}

impl std::fmt::Display for WeatherField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Static rasters at output resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RasterLayer {
    /// Land-use class codes.
    Landuse,
    /// 1 on land, 0 elsewhere.
    Land,
    /// 1 inside exclusive economic zones, 0 elsewhere.
    Eez,
    /// Onshore hub-height wind correction.
    WindCorrectionOn,
    /// Offshore hub-height wind correction.
    WindCorrectionOff,
    /// Elevation above sea level (m).
    Topography,
    /// Fitted elevation factor for onshore wind speeds.
    TopoCorrection,
}

impl RasterLayer {
    /// Array name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Landuse => "landuse",
            Self::Land => "land",
            Self::Eez => "eez",
            Self::WindCorrectionOn => "wind_correction_on",
            Self::WindCorrectionOff => "wind_correction_off",
            Self::Topography => "topography",
            Self::TopoCorrection => "topo_correction",
        }
    }
}

impl std::fmt::Display for RasterLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Source of prepared hourly weather fields.
pub trait WeatherStore: Send + Sync {
    /// Extent and resolution of the weather grid.
    fn weather_grid(&self) -> Result<GridSpec>;

    /// Read a field, optionally restricted to an index quadruple of the
    /// weather grid.
    fn read_field(&self, field: WeatherField, quad: Option<&IndexQuad>) -> Result<HourlyField>;
}

/// Source of static rasters at output resolution.
pub trait RasterStore: Send + Sync {
    /// Extent and resolution of the output grid.
    fn raster_grid(&self) -> Result<GridSpec>;

    /// Read a raster, optionally restricted to an index quadruple of the
    /// output grid.
    fn read_raster(&self, layer: RasterLayer, quad: Option<&IndexQuad>) -> Result<Raster<f32>>;
}
