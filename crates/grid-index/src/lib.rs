//! Coordinate and index mapping between heterogeneous lat/lon grids.
//!
//! Three grids coexist: the coarse weather grid, the high-resolution output
//! grid and the fixed global tile grid. They are related only through the
//! pure functions in [`mapper`]; none of them owns another. [`resample`]
//! moves values between a coarse grid and a finer grid nested inside it.

pub mod mapper;
pub mod quad;
pub mod resample;

pub use mapper::{
    bounds_to_weather_index, cell_of_point, exact_points_from_index, exact_window_from_index,
    index_in_global_grid, index_in_grid, snap_to_resolution,
};
pub use quad::IndexQuad;
pub use resample::ResampleMap;
