//! Region polygons to binary masks on the output grid.

use geo_common::{GeoPoint, GeoWindow, Raster, Resolution, Result};

use crate::region::{Polygon, Region};

/// Turns a region polygon into a 0/1 mask aligned to a grid window.
pub trait RegionRasterizer: Send + Sync {
    /// Mask of `region` over the pixels of `window` at `res`, row 0 north.
    fn rasterize(&self, region: &Region, window: &GeoWindow, res: &Resolution) -> Result<Raster<u8>>;
}

/// Marks pixels whose centre lies inside any polygon of the region.
///
/// Inside-ness uses the even-odd rule over all rings of a polygon, so holes
/// are excluded.
#[derive(Debug, Clone, Copy, Default)]
pub struct PixelCenterRasterizer;

impl RegionRasterizer for PixelCenterRasterizer {
    fn rasterize(&self, region: &Region, window: &GeoWindow, res: &Resolution) -> Result<Raster<u8>> {
        window.validate()?;
        res.validate()?;
        let (rows, cols) = window.pixel_shape(res);
        Ok(Raster::from_fn(rows, cols, |r, c| {
            let centre = GeoPoint::new(
                window.north - (r as f64 + 0.5) * res.lat,
                window.west + (c as f64 + 0.5) * res.lon,
            );
            u8::from(region.polygons.iter().any(|p| polygon_contains(p, &centre)))
        }))
    }
}

/// Even-odd point-in-polygon test.
pub fn polygon_contains(polygon: &Polygon, point: &GeoPoint) -> bool {
    let mut inside = false;
    for ring in polygon.rings() {
        if ring.len() < 3 {
            continue;
        }
        let mut j = ring.len() - 1;
        for i in 0..ring.len() {
            let (a, b) = (&ring[i], &ring[j]);
            if (a.lat > point.lat) != (b.lat > point.lat) {
                let lon_at = a.lon + (point.lat - a.lat) / (b.lat - a.lat) * (b.lon - a.lon);
                if point.lon < lon_at {
                    inside = !inside;
                }
            }
            j = i;
        }
    }
    inside
}
