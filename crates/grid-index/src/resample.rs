//! Resampling between a coarse grid and a finer grid nested inside it.
//!
//! Upsampling replicates each coarse pixel onto every fine pixel whose
//! centre it contains (nearest neighbour). The reverse direction averages
//! the fine pixels that fall into each coarse pixel.

use geo_common::{GeoWindow, Raster, ResourceError, Resolution, Result};

/// Precomputed fine-to-coarse pixel lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct ResampleMap {
    /// Coarse row for each fine row.
    row_map: Vec<usize>,
    /// Coarse column for each fine column.
    col_map: Vec<usize>,
    coarse_rows: usize,
    coarse_cols: usize,
}

impl ResampleMap {
    /// Build the lookup for `fine` nested in `coarse`.
    ///
    /// # Arguments
    /// * `coarse` - Extent of the coarse grid
    /// * `coarse_res` - Resolution of the coarse grid
    /// * `fine` - Extent of the fine grid, must lie inside `coarse`
    /// * `fine_res` - Resolution of the fine grid
    pub fn nearest(
        coarse: &GeoWindow,
        coarse_res: &Resolution,
        fine: &GeoWindow,
        fine_res: &Resolution,
    ) -> Result<Self> {
        coarse_res.validate()?;
        fine_res.validate()?;
        if !coarse.contains(fine) {
            return Err(ResourceError::invalid_window(format!(
                "fine grid {} is not nested in coarse grid {}",
                fine, coarse
            )));
        }

        let (coarse_rows, coarse_cols) = coarse.pixel_shape(coarse_res);
        let (fine_rows, fine_cols) = fine.pixel_shape(fine_res);

        let row_map = (0..fine_rows)
            .map(|i| {
                let lat = fine.north - (i as f64 + 0.5) * fine_res.lat;
                let r = ((coarse.north - lat) / coarse_res.lat).floor().max(0.0) as usize;
                r.min(coarse_rows - 1)
            })
            .collect();
        let col_map = (0..fine_cols)
            .map(|j| {
                let lon = fine.west + (j as f64 + 0.5) * fine_res.lon;
                let c = ((lon - coarse.west) / coarse_res.lon).floor().max(0.0) as usize;
                c.min(coarse_cols - 1)
            })
            .collect();

        Ok(Self {
            row_map,
            col_map,
            coarse_rows,
            coarse_cols,
        })
    }

    /// Shape of the fine grid (rows, cols).
    pub fn fine_shape(&self) -> (usize, usize) {
        (self.row_map.len(), self.col_map.len())
    }

    /// Shape of the coarse grid (rows, cols).
    pub fn coarse_shape(&self) -> (usize, usize) {
        (self.coarse_rows, self.coarse_cols)
    }

    /// Index into a row-major coarse slice for a fine pixel.
    pub fn coarse_index(&self, fine_row: usize, fine_col: usize) -> usize {
        self.row_map[fine_row] * self.coarse_cols + self.col_map[fine_col]
    }

    /// Replicate one row-major coarse slice onto a fine buffer.
    pub fn upsample_into(&self, coarse: &[f32], out: &mut [f32]) -> Result<()> {
        let (rows, cols) = self.fine_shape();
        if coarse.len() != self.coarse_rows * self.coarse_cols || out.len() != rows * cols {
            return Err(ResourceError::missing_data(format!(
                "resample buffers have {} and {} values, expected {} and {}",
                coarse.len(),
                out.len(),
                self.coarse_rows * self.coarse_cols,
                rows * cols
            )));
        }
        for (i, &src_row) in self.row_map.iter().enumerate() {
            let src = &coarse[src_row * self.coarse_cols..(src_row + 1) * self.coarse_cols];
            let dst = &mut out[i * cols..(i + 1) * cols];
            for (d, &src_col) in dst.iter_mut().zip(self.col_map.iter()) {
                *d = src[src_col];
            }
        }
        Ok(())
    }

    /// Replicate a coarse raster onto the fine grid.
    pub fn upsample(&self, coarse: &Raster<f32>) -> Result<Raster<f32>> {
        let (rows, cols) = self.fine_shape();
        let mut out = vec![0.0f32; rows * cols];
        self.upsample_into(coarse.data(), &mut out)?;
        Raster::new(rows, cols, out)
    }

    /// Average the fine pixels falling into each coarse pixel.
    ///
    /// Non-finite fine values are ignored; coarse pixels with no finite
    /// contributor are NaN.
    pub fn block_mean(&self, fine: &Raster<f32>) -> Result<Raster<f32>> {
        let (rows, cols) = self.fine_shape();
        fine.ensure_shape(rows, cols, "fine raster")?;

        let n = self.coarse_rows * self.coarse_cols;
        let mut sum = vec![0.0f64; n];
        let mut count = vec![0usize; n];
        for row in 0..rows {
            for col in 0..cols {
                let v = fine.data()[row * cols + col];
                if v.is_finite() {
                    let k = self.coarse_index(row, col);
                    sum[k] += v as f64;
                    count[k] += 1;
                }
            }
        }

        let data = sum
            .iter()
            .zip(count.iter())
            .map(|(&s, &c)| if c == 0 { f32::NAN } else { (s / c as f64) as f32 })
            .collect();
        Raster::new(self.coarse_rows, self.coarse_cols, data)
    }
}
