//! Index quadruples: 1-based inclusive sub-window bounds.

use std::ops::Range;

use geo_common::{ResourceError, Result};
use serde::{Deserialize, Serialize};

/// Bounds of a sub-window inside a parent grid.
///
/// Rows are numbered from the parent's northern edge and columns from its
/// western edge; the first row/column is 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexQuad {
    pub row_max: usize,
    pub col_max: usize,
    pub row_min: usize,
    pub col_min: usize,
}

impl IndexQuad {
    /// Create a quadruple, rejecting zero indices and inverted bounds.
    pub fn new(row_max: usize, col_max: usize, row_min: usize, col_min: usize) -> Result<Self> {
        if row_min == 0 || col_min == 0 {
            return Err(ResourceError::invalid_window(format!(
                "index quadruple is 1-based, got row_min {} col_min {}",
                row_min, col_min
            )));
        }
        if row_max < row_min || col_max < col_min {
            return Err(ResourceError::invalid_window(format!(
                "inverted index quadruple ({}, {}, {}, {})",
                row_max, col_max, row_min, col_min
            )));
        }
        Ok(Self {
            row_max,
            col_max,
            row_min,
            col_min,
        })
    }

    /// Quadruple covering a whole `rows x cols` grid.
    pub fn full(rows: usize, cols: usize) -> Result<Self> {
        Self::new(rows, cols, 1, 1)
    }

    /// Number of rows covered.
    pub fn rows(&self) -> usize {
        self.row_max - self.row_min + 1
    }

    /// Number of columns covered.
    pub fn cols(&self) -> usize {
        self.col_max - self.col_min + 1
    }

    /// (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows(), self.cols())
    }

    /// 0-based half-open row range for slicing a north-up array.
    pub fn row_range(&self) -> Range<usize> {
        self.row_min - 1..self.row_max
    }

    /// 0-based half-open column range.
    pub fn col_range(&self) -> Range<usize> {
        self.col_min - 1..self.col_max
    }

    /// Check that the quadruple fits inside a `rows x cols` parent.
    pub fn ensure_within(&self, rows: usize, cols: usize) -> Result<()> {
        if self.row_max > rows || self.col_max > cols {
            return Err(ResourceError::invalid_window(format!(
                "{} exceeds parent grid {}x{}",
                self, rows, cols
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for IndexQuad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "rows {}..={} cols {}..={}",
            self.row_min, self.row_max, self.col_min, self.col_max
        )
    }
}
