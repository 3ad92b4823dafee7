//! Renewable technologies handled by the engine.

use serde::{Deserialize, Serialize};

/// A renewable-energy technology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Technology {
    /// Photovoltaic panels.
    #[serde(rename = "PV")]
    Pv,
    /// Concentrated solar power.
    #[serde(rename = "CSP")]
    Csp,
    /// Onshore wind turbines.
    #[serde(rename = "WindOn")]
    WindOn,
    /// Offshore wind turbines.
    #[serde(rename = "WindOff")]
    WindOff,
}

impl Technology {
    /// All technologies, in processing order.
    pub const ALL: [Technology; 4] = [Self::Pv, Self::Csp, Self::WindOn, Self::WindOff];

    /// Parse from string (case-insensitive). Returns None for unknown names.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pv" => Some(Self::Pv),
            "csp" => Some(Self::Csp),
            "windon" | "wind_on" | "onshore" => Some(Self::WindOn),
            "windoff" | "wind_off" | "offshore" => Some(Self::WindOff),
            _ => None,
        }
    }

    /// Get the technology tag as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pv => "PV",
            Self::Csp => "CSP",
            Self::WindOn => "WindOn",
            Self::WindOff => "WindOff",
        }
    }

    /// Solar technologies depend on clearness and skip dark hours.
    pub fn is_solar(&self) -> bool {
        matches!(self, Self::Pv | Self::Csp)
    }
}

impl std::fmt::Display for Technology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
