//! Whole-scope hub-height correction rasters for the wind technologies.

use geo_common::{Raster, ResourceError, Result, Technology};
use grid_index::ResampleMap;
use grid_store::{GridSpec, RasterLayer, RasterStore, WeatherField, WeatherStore};
use resource_model::wind::{apply_mask, fit_topo_correction, topo_correction, CountrySample};
use resource_model::{hub_height_correction, TopoFit, TopoWeight};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::ModelParams;
use crate::rasterize::RegionRasterizer;
use crate::region::Region;

/// Build the correction raster of a wind technology over the output grid.
///
/// Onshore corrections are masked by the land raster, offshore corrections
/// by the exclusive-economic-zone raster. With `topo_correction` set the
/// onshore raster is then scaled by the stored [`RasterLayer::TopoCorrection`].
pub fn build_wind_correction(
    technology: Technology,
    weather_grid: &GridSpec,
    rasters: &dyn RasterStore,
    params: &ModelParams,
) -> Result<Raster<f32>> {
    let (turbine, mask_layer) = match technology {
        Technology::WindOn => (&params.wind_on, RasterLayer::Land),
        Technology::WindOff => (&params.wind_off, RasterLayer::Eez),
        other => {
            return Err(ResourceError::config(format!(
                "{} has no wind correction",
                other
            )))
        }
    };

    let output_grid = rasters.raster_grid()?;
    let landuse = rasters.read_raster(RasterLayer::Landuse, None)?;
    let map = if turbine.resolution_correction {
        Some(ResampleMap::nearest(
            &weather_grid.window,
            &weather_grid.res,
            &output_grid.window,
            &output_grid.res,
        )?)
    } else {
        None
    };

    let correction = hub_height_correction(&landuse, &params.landuse, turbine, map.as_ref())?;
    let mask = rasters.read_raster(mask_layer, None)?;
    let mut masked = apply_mask(&correction, &mask)?;
    let topo = technology == Technology::WindOn && turbine.topo_correction;
    if topo {
        let factor = rasters.read_raster(RasterLayer::TopoCorrection, None)?;
        factor.ensure_shape(masked.rows(), masked.cols(), RasterLayer::TopoCorrection.as_str())?;
        for (c, f) in masked.data_mut().iter_mut().zip(factor.data()) {
            *c *= *f;
        }
    }
    info!(
        technology = %technology,
        rows = masked.rows(),
        cols = masked.cols(),
        hub_height = turbine.hub_height,
        topo_correction = topo,
        "Built wind correction"
    );
    Ok(masked)
}

// ============================================================================
// Topographic correction
// ============================================================================

/// A country and its Global Wind Atlas wind speed samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GwaCountry {
    pub region: Region,
    /// 50 m wind speeds sampled from the atlas, descending.
    pub gwa: Vec<f64>,
    /// Installed onshore capacity (MW).
    #[serde(default)]
    pub capacity: f64,
}

/// Fit the elevation correction against atlas samples and return it with
/// its factor raster over the output grid.
///
/// Each country is compared through the annual mean 50 m wind speed of the
/// weather cells under its pixels and the [`RasterLayer::Topography`]
/// elevation.
pub fn fit_gwa_correction(
    weather: &dyn WeatherStore,
    rasters: &dyn RasterStore,
    rasterizer: &dyn RegionRasterizer,
    countries: &[GwaCountry],
    weight: TopoWeight,
) -> Result<(TopoFit, Raster<f32>)> {
    let weather_grid = weather.weather_grid()?;
    let output_grid = rasters.raster_grid()?;
    let map = ResampleMap::nearest(
        &weather_grid.window,
        &weather_grid.res,
        &output_grid.window,
        &output_grid.res,
    )?;

    let speed = weather.read_field(WeatherField::WindSpeed, None)?;
    let hours = speed.hours();
    if hours == 0 {
        return Err(ResourceError::missing_data("wind speed field has no hours"));
    }
    let mut mean = vec![0.0f64; speed.rows() * speed.cols()];
    for h in 0..hours {
        for (acc, &v) in mean.iter_mut().zip(speed.hour(h)) {
            *acc += v as f64;
        }
    }
    let mean = Raster::new(
        speed.rows(),
        speed.cols(),
        mean.iter().map(|v| (v / hours as f64) as f32).collect(),
    )?;
    let mean = map.upsample(&mean)?;

    let elevation = rasters.read_raster(RasterLayer::Topography, None)?;
    elevation.ensure_shape(mean.rows(), mean.cols(), RasterLayer::Topography.as_str())?;

    let mut samples = Vec::with_capacity(countries.len());
    for country in countries {
        let mask = rasterizer.rasterize(&country.region, &output_grid.window, &output_grid.res)?;
        mask.ensure_shape(mean.rows(), mean.cols(), "country mask")?;
        let inside: Vec<usize> = mask
            .data()
            .iter()
            .enumerate()
            .filter(|(_, m)| **m != 0)
            .map(|(i, _)| i)
            .collect();
        debug!(country = %country.region.name, pixels = inside.len(), "Sampled country");
        samples.push(CountrySample {
            name: country.region.name.clone(),
            wind_speed: inside.iter().map(|&i| mean.data()[i] as f64).collect(),
            elevation: inside.iter().map(|&i| elevation.data()[i] as f64).collect(),
            gwa: country.gwa.clone(),
            capacity: country.capacity,
        });
    }

    let fit = fit_topo_correction(&samples, weight)?;
    info!(a = fit.a, b = fit.b, weight = ?weight, countries = countries.len(), "Fitted topographic correction");
    Ok((fit, topo_correction(&elevation, &fit)))
}
