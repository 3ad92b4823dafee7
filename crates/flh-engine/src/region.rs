//! Regions and the per-region driver.
//!
//! For each region the driver snaps the polygon's bounding box onto the
//! weather grid, derives index quadruples at weather and output resolution,
//! slices the weather fields and static rasters, rasterizes the polygon into
//! a mask and runs the aggregation engine over the year.

use std::sync::Arc;

use geo_common::{
    GeoPoint, GeoWindow, Raster, ResourceError, Resolution, Result, Technology,
};
use grid_index::{
    bounds_to_weather_index, cell_of_point, exact_window_from_index, index_in_grid, IndexQuad,
    ResampleMap,
};
use grid_store::{GridSpec, RasterLayer, RasterStore, WeatherField, WeatherStore};
use resource_model::{LanduseCoefficient, PowerCurve, SolarGeometryRequest};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::aggregate::AggregationEngine;
use crate::config::{EngineConfig, ModelParams};
use crate::inputs::{ModelInputs, RegionInputs};
use crate::job::AggregationJob;
use crate::partition::dispatch_hours;
use crate::rasterize::RegionRasterizer;
use crate::series::HourlySeries;

// ============================================================================
// Regions
// ============================================================================

/// A polygon: one exterior ring and optional holes, vertices in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub exterior: Vec<GeoPoint>,
    #[serde(default)]
    pub holes: Vec<Vec<GeoPoint>>,
}

impl Polygon {
    pub fn new(exterior: Vec<GeoPoint>) -> Self {
        Self {
            exterior,
            holes: Vec::new(),
        }
    }

    pub fn with_holes(exterior: Vec<GeoPoint>, holes: Vec<Vec<GeoPoint>>) -> Self {
        Self { exterior, holes }
    }

    /// Exterior ring followed by the holes.
    pub fn rings(&self) -> impl Iterator<Item = &Vec<GeoPoint>> {
        std::iter::once(&self.exterior).chain(self.holes.iter())
    }
}

/// A named region made of one or more polygons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub name: String,
    pub polygons: Vec<Polygon>,
}

impl Region {
    pub fn new(name: impl Into<String>, polygons: Vec<Polygon>) -> Self {
        Self {
            name: name.into(),
            polygons,
        }
    }

    /// Bounding box of the exterior rings, None without vertices.
    pub fn bounding_window(&self) -> Option<GeoWindow> {
        GeoWindow::bounding(self.polygons.iter().flat_map(|p| p.exterior.iter().copied()))
    }
}

// ============================================================================
// Results
// ============================================================================

/// Annual full-load hours and hourly regional mean for one region.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionFlh {
    pub region: String,
    pub technology: Technology,
    /// Extent of `flh`.
    pub window: GeoWindow,
    pub res: Resolution,
    /// Full-load hours per pixel; NaN where no hour contributed.
    pub flh: Raster<f32>,
    /// Mean capacity factor over the region mask, per hour.
    pub series: HourlySeries,
    /// Hours evaluated after day filtering.
    pub hours: usize,
    /// Pixels inside the region mask.
    pub mask_pixels: usize,
}

impl RegionFlh {
    /// Mean full-load hours over the pixels that have data.
    pub fn mean_flh(&self) -> Option<f32> {
        self.flh.finite_mean()
    }

    pub fn grid(&self) -> GridSpec {
        GridSpec::new(self.window, self.res)
    }
}

/// Hourly capacity factor series at explicit coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointSeries {
    pub technology: Technology,
    pub points: Vec<GeoPoint>,
    /// One series per point, in the order of `points`.
    pub series: Vec<HourlySeries>,
}

/// Where a region sits on the weather and output grids.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionWindows {
    pub weather_quad: IndexQuad,
    pub weather_window: GeoWindow,
    pub output_quad: IndexQuad,
    pub output_window: GeoWindow,
}

/// Correction raster consumed by a wind technology.
pub fn wind_correction_layer(technology: Technology) -> Option<RasterLayer> {
    match technology {
        Technology::WindOn => Some(RasterLayer::WindCorrectionOn),
        Technology::WindOff => Some(RasterLayer::WindCorrectionOff),
        Technology::Pv | Technology::Csp => None,
    }
}

// ============================================================================
// Driver
// ============================================================================

/// Runs the engine region by region against the persisted stores.
pub struct RegionDriver {
    weather: Arc<dyn WeatherStore>,
    rasters: Arc<dyn RasterStore>,
    rasterizer: Arc<dyn RegionRasterizer>,
    config: EngineConfig,
    params: ModelParams,
}

impl RegionDriver {
    /// Create a driver, validating the configuration.
    pub fn new(
        weather: Arc<dyn WeatherStore>,
        rasters: Arc<dyn RasterStore>,
        rasterizer: Arc<dyn RegionRasterizer>,
        config: EngineConfig,
        params: ModelParams,
    ) -> Result<Self> {
        config.validate().map_err(ResourceError::config)?;
        params.validate().map_err(ResourceError::config)?;
        Ok(Self {
            weather,
            rasters,
            rasterizer,
            config,
            params,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    /// Weather and output grids, checked against the configured resolutions.
    fn grids(&self) -> Result<(GridSpec, GridSpec)> {
        let weather = self.weather.weather_grid()?;
        let output = self.rasters.raster_grid()?;
        for (name, stored, configured) in [
            ("weather", weather.res, self.config.res_weather),
            ("output", output.res, self.config.res_desired),
        ] {
            if (stored.lat - configured.lat).abs() > 1e-9 || (stored.lon - configured.lon).abs() > 1e-9 {
                return Err(ResourceError::config(format!(
                    "{} grid resolution {:?} differs from configured {:?}",
                    name, stored, configured
                )));
            }
        }
        Ok((weather, output))
    }

    /// Locate a region on both grids.
    ///
    /// The bounding box is snapped outward onto the weather grid and clipped
    /// to the scope; the output window covers the same extent.
    pub fn region_windows(&self, region: &Region) -> Result<RegionWindows> {
        let (weather, output) = self.grids()?;
        locate_region(region, &weather, &output)
    }

    /// Annual full-load hours of `technology` over `region`.
    ///
    /// Failures while loading the region's inputs come back as
    /// [`ResourceError::Region`]; worker failures keep their own context.
    pub fn compute_flh(&self, technology: Technology, region: &Region) -> Result<RegionFlh> {
        let mut job = AggregationJob::new(&region.name, technology);
        let (windows, res, inputs) = self
            .load_region(technology, region)
            .map_err(|e| ResourceError::region_failure(technology, &region.name, e))?;
        if inputs.mask_count() == 0 {
            warn!(region = %region.name, technology = %technology, "Region mask is empty");
        }
        debug!(
            region = %region.name,
            rows = inputs.shape().0,
            cols = inputs.shape().1,
            mask_pixels = inputs.mask_count(),
            "Loaded region inputs"
        );

        job.advance();
        let hours = dispatch_hours(&inputs);
        let engine = AggregationEngine::new(self.config.workers())?;
        let aggregate = engine.run(&mut job, Arc::clone(&inputs), &hours)?;

        let (rows, cols) = inputs.shape();
        let mut flh = Raster::new(
            rows,
            cols,
            aggregate.flh.iter().map(|&v| v as f32).collect(),
        )?;
        flh.zero_to_nan();

        let result = RegionFlh {
            region: region.name.clone(),
            technology,
            window: windows.output_window,
            res,
            flh,
            series: aggregate.series,
            hours: aggregate.hours,
            mask_pixels: inputs.mask_count(),
        };
        info!(
            region = %region.name,
            technology = %technology,
            hours = result.hours,
            mean_flh = result.mean_flh().unwrap_or(f32::NAN),
            "Region FLH computed"
        );
        Ok(result)
    }

    /// Mask, weather index and model inputs of one region.
    fn load_region(
        &self,
        technology: Technology,
        region: &Region,
    ) -> Result<(RegionWindows, Resolution, Arc<RegionInputs>)> {
        let (weather, output) = self.grids()?;
        let windows = locate_region(region, &weather, &output)?;

        let mask = self
            .rasterizer
            .rasterize(region, &windows.output_window, &output.res)?;
        mask.ensure_shape(
            windows.output_quad.rows(),
            windows.output_quad.cols(),
            "region mask",
        )?;
        let map = ResampleMap::nearest(
            &windows.weather_window,
            &weather.res,
            &windows.output_window,
            &output.res,
        )?;
        let weather_index = RegionInputs::grid_weather_index(&map);
        let geometry = SolarGeometryRequest::Window {
            window: windows.output_window,
            res: output.res,
        };
        let model = self.load_model(
            technology,
            &windows.weather_quad,
            &windows.output_quad,
            geometry,
        )?;
        let inputs = RegionInputs::new(mask, weather_index, model)?;
        Ok((windows, output.res, Arc::new(inputs)))
    }

    /// Hourly capacity factor series at each of `points`.
    ///
    /// Each point reads the weather cell and output pixel that contain it
    /// and is evaluated as a single-pixel region.
    pub fn compute_point_series(&self, technology: Technology, points: &[GeoPoint]) -> Result<PointSeries> {
        let (weather, output) = self.grids()?;
        let engine = AggregationEngine::new(self.config.workers())?;

        let mut series = Vec::with_capacity(points.len());
        for (i, point) in points.iter().enumerate() {
            let name = format!("point {} ({}, {})", i, point.lat, point.lon);
            let inputs = self
                .load_point(technology, point, &weather, &output)
                .map_err(|e| ResourceError::region_failure(technology, &name, e))?;

            let mut job = AggregationJob::new(name, technology);
            job.advance();
            let hours = dispatch_hours(&inputs);
            series.push(engine.run(&mut job, inputs, &hours)?.series);
        }

        info!(technology = %technology, points = points.len(), "Point series computed");
        Ok(PointSeries {
            technology,
            points: points.to_vec(),
            series,
        })
    }

    /// Single-pixel inputs at one point.
    fn load_point(
        &self,
        technology: Technology,
        point: &GeoPoint,
        weather: &GridSpec,
        output: &GridSpec,
    ) -> Result<Arc<RegionInputs>> {
        let weather_quad = single_cell(point, weather)?;
        let output_quad = single_cell(point, output)?;
        let model = self.load_model(
            technology,
            &weather_quad,
            &output_quad,
            SolarGeometryRequest::Points(vec![*point]),
        )?;
        Ok(Arc::new(RegionInputs::new(Raster::filled(1, 1, 1), vec![0], model)?))
    }

    /// Read and prepare the technology's inputs for one window.
    fn load_model(
        &self,
        technology: Technology,
        weather_quad: &IndexQuad,
        output_quad: &IndexQuad,
        geometry: SolarGeometryRequest,
    ) -> Result<ModelInputs> {
        let (rows, cols) = weather_quad.shape();
        let read_field = |field: WeatherField| {
            let data = self.weather.read_field(field, Some(weather_quad))?;
            data.ensure_year(rows, cols, field.as_str())?;
            Ok::<_, ResourceError>(data)
        };
        let (out_rows, out_cols) = output_quad.shape();
        let read_raster = |layer: RasterLayer| {
            let data = self.rasters.read_raster(layer, Some(output_quad))?;
            data.ensure_shape(out_rows, out_cols, layer.as_str())?;
            Ok::<_, ResourceError>(data)
        };

        match technology {
            Technology::Pv => {
                let landuse = read_raster(RasterLayer::Landuse)?;
                Ok(ModelInputs::Pv {
                    geometry,
                    clearness: read_field(WeatherField::Clearness)?,
                    temperature: read_field(WeatherField::Temperature)?,
                    ross: self.params.landuse.remap(&landuse, LanduseCoefficient::Ross)?,
                    albedo: self.params.landuse.remap(&landuse, LanduseCoefficient::Albedo)?,
                    params: self.params.pv.clone(),
                })
            }
            Technology::Csp => Ok(ModelInputs::Csp {
                geometry,
                clearness: read_field(WeatherField::Clearness)?,
                params: self.params.csp.clone(),
            }),
            Technology::WindOn | Technology::WindOff => {
                let (turbine, layer) = match technology {
                    Technology::WindOn => (&self.params.wind_on, RasterLayer::WindCorrectionOn),
                    _ => (&self.params.wind_off, RasterLayer::WindCorrectionOff),
                };
                Ok(ModelInputs::Wind {
                    technology,
                    wind_speed: read_field(WeatherField::WindSpeed)?,
                    correction: read_raster(layer)?,
                    curve: PowerCurve::new(turbine)?,
                })
            }
        }
    }
}

fn locate_region(region: &Region, weather: &GridSpec, output: &GridSpec) -> Result<RegionWindows> {
    let bbox = region.bounding_window().ok_or_else(|| {
        ResourceError::invalid_window(format!("region '{}' has no vertices", region.name))
    })?;
    bbox.validate()?;

    let snapped = bounds_to_weather_index(&bbox, &weather.res);
    let clipped = snapped.intersection(&weather.window).ok_or_else(|| {
        ResourceError::invalid_window(format!(
            "region '{}' {} lies outside the weather grid {}",
            region.name, bbox, weather.window
        ))
    })?;
    let weather_quad = index_in_grid(&clipped, &weather.window, &weather.res)?;
    let weather_window = exact_window_from_index(&weather_quad, &weather.window, &weather.res);

    let covered = weather_window.intersection(&output.window).ok_or_else(|| {
        ResourceError::invalid_window(format!(
            "region '{}' {} lies outside the output grid {}",
            region.name, weather_window, output.window
        ))
    })?;
    let output_quad = index_in_grid(&covered, &output.window, &output.res)?;
    let output_window = exact_window_from_index(&output_quad, &output.window, &output.res);

    Ok(RegionWindows {
        weather_quad,
        weather_window,
        output_quad,
        output_window,
    })
}

/// Index quadruple of the single grid cell containing `point`.
fn single_cell(point: &GeoPoint, grid: &GridSpec) -> Result<IndexQuad> {
    let (row, col) = cell_of_point(point, &grid.window, &grid.res)?;
    IndexQuad::new(row + 1, col + 1, row + 1, col + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_window_uses_exteriors() {
        let region = Region::new(
            "r",
            vec![Polygon::with_holes(
                vec![
                    GeoPoint::new(1.0, 103.6),
                    GeoPoint::new(1.47, 104.1),
                    GeoPoint::new(1.16, 104.0),
                ],
                vec![vec![GeoPoint::new(5.0, 5.0)]],
            )],
        );
        assert_eq!(
            region.bounding_window(),
            Some(GeoWindow::new(1.47, 104.1, 1.0, 103.6))
        );
        assert_eq!(Region::new("empty", vec![]).bounding_window(), None);
    }

    #[test]
    fn test_locate_region_snaps_to_weather_grid() {
        let weather = GridSpec::new(
            GeoWindow::new(2.25, 105.3125, 0.25, 102.8125),
            Resolution::new(0.5, 0.625),
        );
        let output = GridSpec::new(weather.window, Resolution::square(0.125));
        let region = Region::new(
            "sg",
            vec![Polygon::new(vec![
                GeoPoint::new(1.16, 103.6),
                GeoPoint::new(1.47, 103.6),
                GeoPoint::new(1.47, 104.1),
                GeoPoint::new(1.16, 104.1),
            ])],
        );
        let w = locate_region(&region, &weather, &output).unwrap();
        assert_eq!(w.weather_window, GeoWindow::new(1.75, 104.6875, 0.75, 103.4375));
        assert_eq!(w.weather_quad.shape(), (2, 2));
        assert_eq!(w.output_quad.shape(), (8, 10));
        assert!((w.output_window.north - 1.75).abs() < 1e-9);
        assert!((w.output_window.west - 103.4375).abs() < 1e-9);
    }

    #[test]
    fn test_region_outside_scope() {
        let grid = GridSpec::new(GeoWindow::new(1.0, 1.0, 0.0, 0.0), Resolution::square(0.5));
        let region = Region::new("far", vec![Polygon::new(vec![GeoPoint::new(50.0, 50.0)])]);
        let err = locate_region(&region, &grid, &grid).unwrap_err();
        assert!(matches!(err, ResourceError::InvalidWindow(_)));
    }
}
