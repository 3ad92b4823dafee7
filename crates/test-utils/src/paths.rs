//! Path utilities for tests that touch the filesystem.

use std::path::PathBuf;

/// Returns the workspace root directory.
///
/// This is determined by walking up from the test-utils manifest directory.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent()) // workspace root
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// Returns the path to a sample file shipped with a service.
///
/// # Arguments
///
/// * `service_name` - The name of the service (e.g., "flh-runner")
/// * `name` - File name inside the service's `config/` directory
pub fn service_config_file(service_name: &str, name: &str) -> PathBuf {
    workspace_root()
        .join("services")
        .join(service_name)
        .join("config")
        .join(name)
}

/// Creates a temporary directory for a Zarr store.
///
/// The directory is automatically cleaned up when the returned `TempDir` is dropped.
pub fn temp_store_dir() -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix("flh_store_")
        .tempdir()
        .expect("Failed to create temporary store directory")
}
