//! Run file loader for the FLH runner.
//!
//! A run file is YAML with four optional sections (`engine`, `params`,
//! `store`, `points`) plus the regions file and the technologies to run.
//! Values may reference the environment with `${VAR}` or `${VAR:-default}`.
//! A missing `engine` or `store` section is read from the environment
//! (`FLH_*` and `ZARR_*` variables) instead.

use anyhow::{Context, Result};
use flh_engine::{EngineConfig, GwaCountry, ModelParams, Region};
use geo_common::{GeoPoint, Technology};
use grid_store::StoreConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// Run Configuration (run.yaml)
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "EngineConfig::from_env")]
    pub engine: EngineConfig,
    #[serde(default)]
    pub params: ModelParams,
    #[serde(default = "StoreConfig::from_env")]
    pub store: StoreConfig,
    /// GeoJSON-like region list; relative paths resolve against the run file.
    pub regions: PathBuf,
    #[serde(default = "all_technologies")]
    pub technologies: Vec<Technology>,
    /// Sites for hourly point series.
    #[serde(default)]
    pub points: Vec<GeoPoint>,
    /// Global Wind Atlas samples per country, for the topographic fit.
    #[serde(default)]
    pub gwa: Option<PathBuf>,
}

fn all_technologies() -> Vec<Technology> {
    Technology::ALL.to_vec()
}

impl RunConfig {
    /// Wind technologies selected for this run.
    pub fn wind_technologies(&self) -> Vec<Technology> {
        self.technologies
            .iter()
            .copied()
            .filter(|t| !t.is_solar())
            .collect()
    }
}

// ============================================================================
// Loading Functions
// ============================================================================

/// Load and validate a run file with environment variable substitution.
pub fn load_run_config<P: AsRef<Path>>(path: P) -> Result<RunConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read run config from {:?}", path))?;

    let expanded = expand_env_vars(&content)?;

    let mut config: RunConfig = serde_yaml::from_str(&expanded)
        .with_context(|| format!("Failed to parse run config from {:?}", path))?;

    if let Some(dir) = path.parent() {
        if config.regions.is_relative() {
            config.regions = dir.join(&config.regions);
        }
        if let Some(gwa) = config.gwa.as_mut().filter(|p| p.is_relative()) {
            *gwa = dir.join(&*gwa);
        }
    }

    validate_run_config(&config)?;

    Ok(config)
}

/// Load the region list (JSON array of named polygon sets).
pub fn load_regions<P: AsRef<Path>>(path: P) -> Result<Vec<Region>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read regions from {:?}", path))?;

    let regions: Vec<Region> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse regions from {:?}", path))?;

    for region in &regions {
        anyhow::ensure!(!region.name.is_empty(), "Region names cannot be empty");
        anyhow::ensure!(
            region.bounding_window().is_some(),
            "Region {} has no polygon vertices",
            region.name
        );
    }

    Ok(regions)
}

/// Load the atlas samples of each country (JSON array).
pub fn load_gwa_countries<P: AsRef<Path>>(path: P) -> Result<Vec<GwaCountry>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read atlas samples from {:?}", path))?;

    let countries: Vec<GwaCountry> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse atlas samples from {:?}", path))?;

    anyhow::ensure!(!countries.is_empty(), "No countries in {:?}", path);
    for country in &countries {
        anyhow::ensure!(
            !country.gwa.is_empty(),
            "Country {} has no atlas samples",
            country.region.name
        );
        anyhow::ensure!(
            country.capacity >= 0.0,
            "Country {} has negative capacity",
            country.region.name
        );
    }

    Ok(countries)
}

// ============================================================================
// Environment Variable Expansion
// ============================================================================

/// Expand `${VAR}` and `${VAR:-default}` references.
fn expand_env_vars(content: &str) -> Result<String> {
    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' || chars.peek() != Some(&'{') {
            result.push(ch);
            continue;
        }
        chars.next();

        let mut var_expr = String::new();
        loop {
            match chars.next() {
                Some('}') => break,
                Some(c) => var_expr.push(c),
                None => anyhow::bail!("Unclosed variable substitution: ${{{}", var_expr),
            }
        }

        result.push_str(&resolve_var_expr(&var_expr)?);
    }

    Ok(result)
}

/// Resolve `VAR` or `VAR:-default`.
fn resolve_var_expr(expr: &str) -> Result<String> {
    if let Some((var_name, default)) = expr.split_once(":-") {
        match std::env::var(var_name.trim()) {
            Ok(val) if !val.is_empty() => Ok(val),
            _ => Ok(default.to_string()),
        }
    } else {
        std::env::var(expr.trim()).with_context(|| format!("Environment variable {} not set", expr))
    }
}

// ============================================================================
// Validation
// ============================================================================

fn validate_run_config(config: &RunConfig) -> Result<()> {
    config
        .engine
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid engine config: {}", e))?;
    config
        .params
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid model params: {}", e))?;
    config
        .store
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid store config: {}", e))?;

    anyhow::ensure!(
        !config.technologies.is_empty(),
        "At least one technology must be selected"
    );
    for (i, tech) in config.technologies.iter().enumerate() {
        anyhow::ensure!(
            !config.technologies[..i].contains(tech),
            "Technology {} listed twice",
            tech
        );
    }

    for point in &config.points {
        anyhow::ensure!(
            (-90.0..=90.0).contains(&point.lat) && (-180.0..=180.0).contains(&point.lon),
            "Point ({}, {}) is outside the globe",
            point.lat,
            point.lon
        );
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_expand_env_vars_simple() {
        std::env::set_var("FLH_TEST_ROOT", "/data/flh");
        let result = expand_env_vars("root: ${FLH_TEST_ROOT}/store").unwrap();
        assert_eq!(result, "root: /data/flh/store");
    }

    #[test]
    fn test_expand_env_vars_with_default() {
        std::env::remove_var("FLH_TEST_UNSET");
        let result = expand_env_vars("nproc: ${FLH_TEST_UNSET:-8}").unwrap();
        assert_eq!(result, "nproc: 8");
    }

    #[test]
    fn test_expand_env_vars_missing_required() {
        std::env::remove_var("FLH_TEST_REQUIRED");
        assert!(expand_env_vars("${FLH_TEST_REQUIRED}").is_err());
        assert!(expand_env_vars("${UNCLOSED").is_err());
    }

    #[test]
    fn test_resolve_var_expr_override_default() {
        std::env::set_var("FLH_TEST_YEAR", "2016");
        assert_eq!(resolve_var_expr("FLH_TEST_YEAR:-2015").unwrap(), "2016");
    }

    #[test]
    fn test_load_run_config_resolves_regions_and_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.yaml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(
            file,
            "engine:\n  nproc: ${{FLH_TEST_NPROC:-4}}\n  year: 2016\nregions: regions.json\ntechnologies: [PV, WindOn]"
        )
        .unwrap();

        let config = load_run_config(&path).unwrap();
        assert_eq!(config.engine.nproc, 4);
        assert_eq!(config.engine.year, 2016);
        assert_eq!(config.regions, dir.path().join("regions.json"));
        assert_eq!(config.technologies, vec![Technology::Pv, Technology::WindOn]);
        assert_eq!(config.wind_technologies(), vec![Technology::WindOn]);
        assert_eq!(config.params, ModelParams::default());
    }

    #[test]
    fn test_missing_sections_fall_back_to_environment() {
        std::env::set_var("FLH_YEAR", "2019");
        std::env::set_var("ZARR_CHUNK_SIZE", "128");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.yaml");
        fs::write(&path, "regions: regions.json\n").unwrap();

        let config = load_run_config(&path).unwrap();
        assert_eq!(config.engine.year, 2019);
        assert_eq!(config.store.chunk_size, 128);
        assert_eq!(config.technologies, Technology::ALL.to_vec());
    }

    #[test]
    fn test_gwa_path_resolves_and_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.yaml");
        fs::write(&path, "engine:\n  year: 2015\nregions: regions.json\ngwa: gwa.json\n").unwrap();
        let config = load_run_config(&path).unwrap();
        assert_eq!(config.gwa, Some(dir.path().join("gwa.json")));

        fs::write(
            dir.path().join("gwa.json"),
            r#"[{"region": {"name": "AT", "polygons": [{"exterior": [{"lat": 47.0, "lon": 10.0}]}]},
                "gwa": [9.1, 7.4, 5.0], "capacity": 3159.0}]"#,
        )
        .unwrap();
        let countries = load_gwa_countries(dir.path().join("gwa.json")).unwrap();
        assert_eq!(countries[0].region.name, "AT");
        assert_eq!(countries[0].gwa.len(), 3);

        fs::write(dir.path().join("empty.json"), "[]").unwrap();
        assert!(load_gwa_countries(dir.path().join("empty.json")).is_err());
    }

    #[test]
    fn test_duplicate_technology_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.yaml");
        fs::write(&path, "regions: r.json\ntechnologies: [CSP, CSP]\n").unwrap();
        let err = load_run_config(&path).unwrap_err();
        assert!(err.to_string().contains("listed twice"), "{}", err);
    }

    #[test]
    fn test_invalid_engine_config_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.yaml");
        fs::write(&path, "engine:\n  nproc: 0\nregions: r.json\n").unwrap();
        assert!(load_run_config(&path).is_err());
    }

    #[test]
    fn test_load_sample_files() {
        std::env::remove_var("FLH_STORE_ROOT");
        let config = load_run_config(test_utils::service_config_file("flh-runner", "run.yaml")).unwrap();
        assert_eq!(config.technologies.len(), 4);

        let regions = load_regions(&config.regions).unwrap();
        assert!(!regions.is_empty());
        assert!(regions.iter().any(|r| r.name == "Singapore"));
    }
}
