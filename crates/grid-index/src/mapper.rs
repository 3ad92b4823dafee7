//! Pure mapping functions between windows and index quadruples.
//!
//! Index arithmetic works in pixel units. Values within [`PIXEL_TOLERANCE`]
//! of an integer are treated as that integer so that edges lying exactly on
//! the grid never gain or lose a pixel to floating-point noise.

use geo_common::{GeoPoint, GeoWindow, ResourceError, Resolution, Result};

use crate::quad::IndexQuad;

/// Fraction of a pixel under which an offset is considered exact.
pub const PIXEL_TOLERANCE: f64 = 1e-6;

fn floor_tol(x: f64) -> f64 {
    (x + PIXEL_TOLERANCE).floor()
}

fn ceil_tol(x: f64) -> f64 {
    (x - PIXEL_TOLERANCE).ceil()
}

/// Convert a pixel offset to a usize, saturating negatives to zero.
fn to_index(x: f64) -> usize {
    if x <= 0.0 {
        0
    } else {
        x as usize
    }
}

/// Snap a window outward onto the weather grid.
///
/// Weather pixels are centred on multiples of the resolution, so the
/// returned edges are multiples of the resolution offset by half a pixel.
/// The result always encloses `window`.
pub fn bounds_to_weather_index(window: &GeoWindow, res: &Resolution) -> GeoWindow {
    let (rl, rw) = (res.lat, res.lon);
    GeoWindow {
        north: ceil_tol((window.north - rl / 2.0) / rl) * rl + rl / 2.0,
        east: ceil_tol((window.east - rw / 2.0) / rw) * rw + rw / 2.0,
        south: floor_tol((window.south + rl / 2.0) / rl) * rl - rl / 2.0,
        west: floor_tol((window.west + rw / 2.0) / rw) * rw - rw / 2.0,
    }
}

/// Snap a window outward to multiples of the output resolution.
pub fn snap_to_resolution(window: &GeoWindow, res: &Resolution) -> GeoWindow {
    GeoWindow {
        north: ceil_tol(window.north / res.lat) * res.lat,
        east: ceil_tol(window.east / res.lon) * res.lon,
        south: floor_tol(window.south / res.lat) * res.lat,
        west: floor_tol(window.west / res.lon) * res.lon,
    }
}

/// Locate `window` inside `parent` as a 1-based index quadruple.
///
/// # Arguments
/// * `window` - Sub-window to locate
/// * `parent` - Extent of the parent grid
/// * `res` - Resolution of the parent grid
///
/// # Returns
/// The quadruple of every parent pixel the window touches. A window with a
/// zero-extent axis maps to a single row or column.
pub fn index_in_grid(window: &GeoWindow, parent: &GeoWindow, res: &Resolution) -> Result<IndexQuad> {
    window.validate()?;
    res.validate()?;
    if !parent.contains(window) {
        return Err(ResourceError::invalid_window(format!(
            "{} lies outside parent grid {}",
            window, parent
        )));
    }

    let (parent_rows, parent_cols) = parent.pixel_shape(res);
    let row_min = to_index(floor_tol((parent.north - window.north) / res.lat)) + 1;
    let row_max = to_index(ceil_tol((parent.north - window.south) / res.lat));
    let col_min = to_index(floor_tol((window.west - parent.west) / res.lon)) + 1;
    let col_max = to_index(ceil_tol((window.east - parent.west) / res.lon));

    clamp_quad(row_max, col_max, row_min, col_min, parent_rows, parent_cols)
}

/// Locate `window` inside the fixed global grid (90N..90S, 180W..180E).
///
/// Tiled global datasets are addressed this way; offsets are rounded to the
/// nearest pixel edge.
pub fn index_in_global_grid(window: &GeoWindow, res: &Resolution) -> Result<IndexQuad> {
    window.validate()?;
    res.validate()?;
    let global = GeoWindow::global();
    if !global.contains(window) {
        return Err(ResourceError::invalid_window(format!(
            "{} lies outside the globe",
            window
        )));
    }

    let (global_rows, global_cols) = global.pixel_shape(res);
    let row_min = to_index(((90.0 - window.north) / res.lat).round()) + 1;
    let row_max = to_index(((90.0 - window.south) / res.lat).round());
    let col_min = to_index(((180.0 + window.west) / res.lon).round()) + 1;
    let col_max = to_index(((180.0 + window.east) / res.lon).round());

    clamp_quad(row_max, col_max, row_min, col_min, global_rows, global_cols)
}

fn clamp_quad(
    row_max: usize,
    col_max: usize,
    row_min: usize,
    col_min: usize,
    parent_rows: usize,
    parent_cols: usize,
) -> Result<IndexQuad> {
    let row_min = row_min.min(parent_rows);
    let col_min = col_min.min(parent_cols);
    let row_max = row_max.clamp(row_min, parent_rows);
    let col_max = col_max.clamp(col_min, parent_cols);
    IndexQuad::new(row_max, col_max, row_min, col_min)
}

/// Reconstruct the exact window edges of an index quadruple.
pub fn exact_window_from_index(quad: &IndexQuad, parent: &GeoWindow, res: &Resolution) -> GeoWindow {
    GeoWindow {
        north: parent.north - (quad.row_min - 1) as f64 * res.lat,
        east: parent.west + quad.col_max as f64 * res.lon,
        south: parent.north - quad.row_max as f64 * res.lat,
        west: parent.west + (quad.col_min - 1) as f64 * res.lon,
    }
}

/// Pixel-centre coordinates of 0-based (row, col) cells of a parent grid.
pub fn exact_points_from_index(
    cells: &[(usize, usize)],
    parent: &GeoWindow,
    res: &Resolution,
) -> Vec<GeoPoint> {
    cells
        .iter()
        .map(|&(row, col)| {
            GeoPoint::new(
                parent.north - (row as f64 + 0.5) * res.lat,
                parent.west + (col as f64 + 0.5) * res.lon,
            )
        })
        .collect()
}

/// 0-based (row, col) of the parent pixel containing `point`.
///
/// Points on the southern or eastern edge belong to the last row/column.
pub fn cell_of_point(point: &GeoPoint, parent: &GeoWindow, res: &Resolution) -> Result<(usize, usize)> {
    if !parent.contains_point(point) {
        return Err(ResourceError::invalid_window(format!(
            "point ({}, {}) lies outside parent grid {}",
            point.lat, point.lon, parent
        )));
    }
    let (rows, cols) = parent.pixel_shape(res);
    let (Some(last_row), Some(last_col)) = (rows.checked_sub(1), cols.checked_sub(1)) else {
        return Err(ResourceError::invalid_window(format!(
            "parent grid {} has no pixels at {:?}",
            parent, res
        )));
    };
    let row = to_index(floor_tol((parent.north - point.lat) / res.lat)).min(last_row);
    let col = to_index(floor_tol((point.lon - parent.west) / res.lon)).min(last_col);
    Ok((row, col))
}
