//! Wind resource models.

pub mod correction;
pub mod power_curve;
pub mod topography;

pub use correction::{apply_mask, hub_height_correction, REFERENCE_HEIGHT};
pub use power_curve::PowerCurve;
pub use topography::{fit_topo_correction, topo_correction, CountrySample, TopoFit, TopoWeight};
