//! Array writers.

mod zarr_writer;

pub use zarr_writer::{ArrayMetadata, ZarrWriter};
