//! Shared test utilities for the resource FLH workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Synthetic weather field and raster generators
//! - An in-memory scope fixture backed by `MemoryStore`
//! - Temporary store directories
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{ScopeFixture, assert_approx_eq};
//! ```

pub mod fixtures;
pub mod generators;
pub mod paths;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;
pub use paths::*;

/// Assert that two numbers agree within an absolute tolerance.
///
/// Both sides are widened to `f64`, so `f32` rasters and `f64` series can be
/// compared directly.
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(result.flh.get(0, 0).unwrap(), 1250.0, 0.5);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $tolerance:expr) => {{
        let (left, right, tolerance) = ($left as f64, $right as f64, $tolerance as f64);
        if !((left - right).abs() <= tolerance) {
            panic!(
                "values differ by more than {}: left = {}, right = {}",
                tolerance, left, right
            );
        }
    }};
}
