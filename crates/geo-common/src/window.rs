//! Geographic windows and points.

use serde::{Deserialize, Serialize};

use crate::error::{ResourceError, Result};
use crate::grid::Resolution;

/// Tolerance (degrees) used when comparing window edges.
pub const EDGE_TOLERANCE: f64 = 1e-9;

/// A geographic bounding box in degrees.
///
/// Edges are stored in the order used throughout the engine:
/// north, east, south, west.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoWindow {
    pub north: f64,
    pub east: f64,
    pub south: f64,
    pub west: f64,
}

impl GeoWindow {
    /// Create a new window from its four edges.
    pub fn new(north: f64, east: f64, south: f64, west: f64) -> Self {
        Self {
            north,
            east,
            south,
            west,
        }
    }

    /// The whole globe.
    pub fn global() -> Self {
        Self::new(90.0, 180.0, -90.0, -180.0)
    }

    /// Check that the edges are finite and not inverted.
    ///
    /// Zero extent on an axis is accepted; such windows describe a point or
    /// a line and degenerate to a single pixel on that axis.
    pub fn validate(&self) -> Result<()> {
        let edges = [self.north, self.east, self.south, self.west];
        if edges.iter().any(|v| !v.is_finite()) {
            return Err(ResourceError::invalid_window(format!(
                "non-finite edge in {}",
                self
            )));
        }
        if self.north < self.south || self.east < self.west {
            return Err(ResourceError::invalid_window(format!(
                "inverted edges in {}",
                self
            )));
        }
        Ok(())
    }

    /// Height of the window in degrees of latitude.
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Width of the window in degrees of longitude.
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Number of pixels (rows, cols) this window spans at `res`.
    ///
    /// A zero-extent axis yields one pixel.
    pub fn pixel_shape(&self, res: &Resolution) -> (usize, usize) {
        let rows = (self.height() / res.lat).round().max(1.0) as usize;
        let cols = (self.width() / res.lon).round().max(1.0) as usize;
        (rows, cols)
    }

    /// Check if this window overlaps another (touching edges do not count).
    pub fn intersects(&self, other: &GeoWindow) -> bool {
        self.west < other.east
            && self.east > other.west
            && self.south < other.north
            && self.north > other.south
    }

    /// Compute the overlap of two windows.
    pub fn intersection(&self, other: &GeoWindow) -> Option<GeoWindow> {
        if !self.intersects(other) {
            return None;
        }

        Some(GeoWindow {
            north: self.north.min(other.north),
            east: self.east.min(other.east),
            south: self.south.max(other.south),
            west: self.west.max(other.west),
        })
    }

    /// Check whether `other` lies inside this window (edges inclusive).
    pub fn contains(&self, other: &GeoWindow) -> bool {
        other.north <= self.north + EDGE_TOLERANCE
            && other.south >= self.south - EDGE_TOLERANCE
            && other.east <= self.east + EDGE_TOLERANCE
            && other.west >= self.west - EDGE_TOLERANCE
    }

    /// Check if a point is contained within this window.
    pub fn contains_point(&self, point: &GeoPoint) -> bool {
        point.lat >= self.south
            && point.lat <= self.north
            && point.lon >= self.west
            && point.lon <= self.east
    }

    /// Smallest window enclosing all points. Returns None for no points.
    pub fn bounding<I>(points: I) -> Option<GeoWindow>
    where
        I: IntoIterator<Item = GeoPoint>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut window = GeoWindow::new(first.lat, first.lon, first.lat, first.lon);
        for p in iter {
            window.north = window.north.max(p.lat);
            window.south = window.south.min(p.lat);
            window.east = window.east.max(p.lon);
            window.west = window.west.min(p.lon);
        }
        Some(window)
    }

    /// Attribute representation stored alongside persisted arrays.
    pub fn to_attribute(&self) -> [f64; 4] {
        [self.north, self.east, self.south, self.west]
    }

    /// Inverse of [`GeoWindow::to_attribute`].
    pub fn from_attribute(values: &[f64]) -> Option<Self> {
        match values {
            [north, east, south, west] => Some(Self::new(*north, *east, *south, *west)),
            _ => None,
        }
    }
}

impl std::fmt::Display for GeoWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[N {:.6}, E {:.6}, S {:.6}, W {:.6}]",
            self.north, self.east, self.south, self.west
        )
    }
}

/// A single geographic location in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}
