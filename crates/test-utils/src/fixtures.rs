//! Common test fixtures for FLH tests.
//!
//! This module provides pre-defined windows and a small in-memory scope
//! with synthetic weather and rasters.

use geo_common::{GeoPoint, GeoWindow, Raster, Resolution};
use grid_store::{GridSpec, MemoryStore, RasterLayer, WeatherField};

use crate::generators::{constant_field, cycling_wind, diurnal_clearness, uniform_landuse};

/// Common window definitions for testing.
pub mod windows {
    use geo_common::GeoWindow;

    /// Two by two weather pixels around Singapore, aligned to the
    /// 0.5 x 0.625 degree weather grid.
    pub const SINGAPORE: GeoWindow = GeoWindow {
        north: 1.75,
        east: 104.6875,
        south: 0.75,
        west: 103.4375,
    };

    /// Unaligned bounding box of the island.
    pub const SINGAPORE_ISLAND: GeoWindow = GeoWindow {
        north: 1.47,
        east: 104.1,
        south: 1.16,
        west: 103.6,
    };

    /// Single point (degenerate window)
    pub const POINT: GeoWindow = GeoWindow {
        north: 1.35,
        east: 103.8,
        south: 1.35,
        west: 103.8,
    };
}

/// Common resolutions.
pub mod resolutions {
    use geo_common::Resolution;

    /// Reanalysis weather grid.
    pub const WEATHER: Resolution = Resolution { lat: 0.5, lon: 0.625 };

    /// Coarse output grid used by fast tests (4 x 5 pixels per weather pixel).
    pub const COARSE_OUTPUT: Resolution = Resolution { lat: 0.125, lon: 0.125 };
}

/// Closed ring tracing the edges of `window`.
pub fn window_ring(window: &GeoWindow) -> Vec<GeoPoint> {
    vec![
        GeoPoint::new(window.north, window.west),
        GeoPoint::new(window.north, window.east),
        GeoPoint::new(window.south, window.east),
        GeoPoint::new(window.south, window.west),
    ]
}

/// A scope with matching weather and output grids.
#[derive(Debug, Clone, Copy)]
pub struct ScopeFixture {
    pub weather: GridSpec,
    pub output: GridSpec,
}

impl ScopeFixture {
    /// Singapore scope at weather and coarse output resolution.
    pub fn singapore() -> Self {
        Self {
            weather: GridSpec::new(windows::SINGAPORE, resolutions::WEATHER),
            output: GridSpec::new(windows::SINGAPORE, resolutions::COARSE_OUTPUT),
        }
    }

    /// Same scope at a chosen output resolution.
    pub fn with_output_res(mut self, res: Resolution) -> Self {
        self.output = GridSpec::new(self.output.window, res);
        self
    }

    /// Populated in-memory store.
    ///
    /// Fields: clearness 0.6 by local day, 300 K, wind cycling 0..30 m/s.
    /// Rasters: grassland everywhere, all land, no sea, unit wind
    /// corrections.
    pub fn store(&self) -> MemoryStore {
        let (wr, wc) = self.weather.shape();
        let (or, oc) = self.output.shape();
        let centre_lon = (self.weather.window.east + self.weather.window.west) / 2.0;

        MemoryStore::new(self.weather, self.output)
            .with_field(WeatherField::Clearness, diurnal_clearness(wr, wc, 0.6, centre_lon / 15.0))
            .expect("clearness shape")
            .with_field(WeatherField::Temperature, constant_field(wr, wc, 300.0))
            .expect("temperature shape")
            .with_field(WeatherField::WindSpeed, cycling_wind(wr, wc, 30))
            .expect("wind shape")
            .with_raster(RasterLayer::Landuse, uniform_landuse(or, oc, 10))
            .expect("landuse shape")
            .with_raster(RasterLayer::Land, Raster::filled(or, oc, 1.0))
            .expect("land shape")
            .with_raster(RasterLayer::Eez, Raster::filled(or, oc, 0.0))
            .expect("eez shape")
            .with_raster(RasterLayer::WindCorrectionOn, Raster::filled(or, oc, 1.0))
            .expect("correction shape")
            .with_raster(RasterLayer::WindCorrectionOff, Raster::filled(or, oc, 1.0))
            .expect("correction shape")
    }
}
