//! Engine configuration.

use geo_common::Resolution;
use resource_model::{CspParams, LanduseTable, PvParams, TurbineParams};
use serde::{Deserialize, Serialize};

/// Execution settings shared by every region and technology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of workers per technology run.
    pub nproc: usize,

    /// Cap the worker count at the machine's available parallelism.
    pub cpu_limit: bool,

    /// Resolution of the weather grid (degrees).
    pub res_weather: Resolution,

    /// Resolution of the output grid (degrees).
    pub res_desired: Resolution,

    /// Weather year.
    pub year: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            nproc: 36,
            cpu_limit: true,
            res_weather: Resolution::new(0.5, 0.625),
            res_desired: Resolution::square(1.0 / 240.0),
            year: 2015,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// Resolutions are given as `lat,lon` in degrees.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("FLH_NPROC") {
            if let Ok(n) = val.parse() {
                config.nproc = n;
            }
        }

        if let Ok(val) = std::env::var("FLH_CPU_LIMIT") {
            config.cpu_limit = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = std::env::var("FLH_RES_WEATHER") {
            if let Some(res) = parse_resolution(&val) {
                config.res_weather = res;
            }
        }

        if let Ok(val) = std::env::var("FLH_RES_DESIRED") {
            if let Some(res) = parse_resolution(&val) {
                config.res_desired = res;
            }
        }

        if let Ok(val) = std::env::var("FLH_YEAR") {
            if let Ok(year) = val.parse() {
                config.year = year;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.nproc == 0 {
            return Err("nproc must be > 0".to_string());
        }

        for (name, res) in [("res_weather", &self.res_weather), ("res_desired", &self.res_desired)] {
            if let Err(e) = res.validate() {
                return Err(format!("{}: {}", name, e));
            }
        }

        if self.res_desired.lat > self.res_weather.lat || self.res_desired.lon > self.res_weather.lon {
            return Err("res_desired must not be coarser than res_weather".to_string());
        }

        if !(1900..=2100).contains(&self.year) {
            return Err(format!("year {} out of range", self.year));
        }

        Ok(())
    }

    /// Worker count after applying the CPU cap.
    pub fn workers(&self) -> usize {
        if !self.cpu_limit {
            return self.nproc.max(1);
        }
        let available = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        self.nproc.min(available).max(1)
    }
}

fn parse_resolution(s: &str) -> Option<Resolution> {
    let mut parts = s.split(',').map(|p| p.trim().parse::<f64>());
    match (parts.next(), parts.next(), parts.next()) {
        (Some(Ok(lat)), Some(Ok(lon)), None) => Some(Resolution::new(lat, lon)),
        (Some(Ok(deg)), None, None) => Some(Resolution::square(deg)),
        _ => None,
    }
}

/// Physical parameters for every technology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParams {
    pub landuse: LanduseTable,
    pub pv: PvParams,
    pub csp: CspParams,
    pub wind_on: TurbineParams,
    pub wind_off: TurbineParams,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            landuse: LanduseTable::default(),
            pv: PvParams::default(),
            csp: CspParams::default(),
            wind_on: TurbineParams::onshore(),
            wind_off: TurbineParams::offshore(),
        }
    }
}

impl ModelParams {
    /// Validate every parameter set.
    pub fn validate(&self) -> Result<(), String> {
        self.landuse.validate().map_err(|e| format!("landuse: {}", e))?;
        self.pv.validate().map_err(|e| format!("pv: {}", e))?;
        self.csp.validate().map_err(|e| format!("csp: {}", e))?;
        self.wind_on.validate().map_err(|e| format!("wind_on: {}", e))?;
        self.wind_off.validate().map_err(|e| format!("wind_off: {}", e))?;
        if self.wind_off.topo_correction {
            return Err("wind_off: topographic correction applies onshore only".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert!(ModelParams::default().validate().is_ok());
        assert!((config.res_desired.lat - 1.0 / 240.0).abs() < 1e-15);
    }

    #[test]
    fn test_invalid_config() {
        let config = EngineConfig {
            nproc: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = EngineConfig {
            res_desired: Resolution::square(1.0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_offshore_topo_correction_rejected() {
        let mut params = ModelParams::default();
        params.wind_on.topo_correction = true;
        assert!(params.validate().is_ok());
        params.wind_off.topo_correction = true;
        assert!(params.validate().unwrap_err().contains("onshore only"));
    }

    #[test]
    fn test_worker_cap() {
        let config = EngineConfig {
            nproc: 100_000,
            cpu_limit: true,
            ..Default::default()
        };
        assert!(config.workers() < 100_000);

        let config = EngineConfig {
            nproc: 3,
            cpu_limit: false,
            ..Default::default()
        };
        assert_eq!(config.workers(), 3);
    }

    #[test]
    fn test_parse_resolution() {
        assert_eq!(parse_resolution("0.5, 0.625"), Some(Resolution::new(0.5, 0.625)));
        assert_eq!(parse_resolution("0.25"), Some(Resolution::square(0.25)));
        assert_eq!(parse_resolution("a,b"), None);
        assert_eq!(parse_resolution("1,2,3"), None);
    }
}
