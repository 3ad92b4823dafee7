//! Persisted run outputs.
//!
//! ```text
//! <root>/flh/<tech>/<region>.zarr         annual FLH, NaN where no data
//! <root>/series/<tech>/<region>.json      hourly regional mean CF
//! <root>/series/<tech>/points.json        hourly CF per point
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use flh_engine::{HourlySeries, PointSeries, RegionFlh};
use geo_common::{GeoWindow, Technology};
use grid_store::store::FLH_GROUP;
use grid_store::{ArrayMetadata, ZarrStore};
use serde::{Deserialize, Serialize};

const SERIES_DIR: &str = "series";

/// Summary written next to the hourly series of a region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSeriesRecord {
    pub region: String,
    pub technology: Technology,
    pub window: GeoWindow,
    pub hours: usize,
    pub mask_pixels: usize,
    pub mean_flh: Option<f32>,
    pub series: HourlySeries,
}

impl From<&RegionFlh> for RegionSeriesRecord {
    fn from(result: &RegionFlh) -> Self {
        Self {
            region: result.region.clone(),
            technology: result.technology,
            window: result.window,
            hours: result.hours,
            mask_pixels: result.mask_pixels,
            mean_flh: result.mean_flh(),
            series: result.series.clone(),
        }
    }
}

/// File-system safe form of a region name.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// Group holding the FLH arrays of one technology.
pub fn flh_group(technology: Technology) -> String {
    format!("{}/{}", FLH_GROUP, technology.as_str())
}

fn series_dir(root: &Path, technology: Technology) -> PathBuf {
    root.join(SERIES_DIR).join(technology.as_str())
}

/// Write the FLH raster of a region result.
pub fn write_flh(store: &ZarrStore, result: &RegionFlh) -> Result<ArrayMetadata> {
    let group = flh_group(result.technology);
    let name = sanitize_name(&result.region);
    store
        .write_raster(&group, &name, &result.flh, &result.grid(), "h")
        .with_context(|| format!("Failed to write FLH for {}/{}", group, name))
}

/// Write the hourly series of a region result as JSON.
pub fn write_region_series(root: &Path, result: &RegionFlh) -> Result<PathBuf> {
    let dir = series_dir(root, result.technology);
    let path = dir.join(format!("{}.json", sanitize_name(&result.region)));
    write_json(&path, &RegionSeriesRecord::from(result))?;
    Ok(path)
}

/// Write point series as JSON.
pub fn write_point_series(root: &Path, series: &PointSeries) -> Result<PathBuf> {
    let path = series_dir(root, series.technology).join("points.json");
    write_json(&path, series)?;
    Ok(path)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))?;
    }
    let json = serde_json::to_vec(value).context("Failed to serialize output")?;
    fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))
}
