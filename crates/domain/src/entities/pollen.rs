//! Pollen measurements

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Pollen species tracked by either pollen source
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollenSpecies {
    Alder,
    Birch,
    Grass,
    Hazel,
    /// Ragweed
    Ambrosia,
    Mugwort,
}

impl PollenSpecies {
    pub const ALL: [Self; 6] = [
        Self::Alder,
        Self::Birch,
        Self::Grass,
        Self::Hazel,
        Self::Ambrosia,
        Self::Mugwort,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Alder => "alder",
            Self::Birch => "birch",
            Self::Grass => "grass",
            Self::Hazel => "hazel",
            Self::Ambrosia => "ambrosia",
            Self::Mugwort => "mugwort",
        }
    }
}

impl fmt::Display for PollenSpecies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Level bucket of a pollen index
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollenLevel {
    None,
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl PollenLevel {
    /// Bucket for a 0-4 index; values above 4 saturate
    #[must_use]
    pub const fn from_index(index: u8) -> Self {
        match index {
            0 => Self::None,
            1 => Self::Low,
            2 => Self::Moderate,
            3 => Self::High,
            _ => Self::VeryHigh,
        }
    }

    /// Bucket for a concentration in grains/m³
    ///
    /// Thresholds: `<1` none, `<20` low, `<70` moderate, `<300` high.
    #[must_use]
    pub fn from_concentration(grains_per_m3: f64) -> Self {
        if grains_per_m3 < 1.0 {
            Self::None
        } else if grains_per_m3 < 20.0 {
            Self::Low
        } else if grains_per_m3 < 70.0 {
            Self::Moderate
        } else if grains_per_m3 < 300.0 {
            Self::High
        } else {
            Self::VeryHigh
        }
    }

    /// 0-4 index of this bucket
    #[must_use]
    pub const fn index(&self) -> u8 {
        match self {
            Self::None => 0,
            Self::Low => 1,
            Self::Moderate => 2,
            Self::High => 3,
            Self::VeryHigh => 4,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::VeryHigh => "very_high",
        }
    }
}

impl fmt::Display for PollenLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pollen reading for one species
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollenMeasurement {
    /// 0-4 index, absent when the species is not active
    pub value: Option<u8>,
    pub level: PollenLevel,
    pub observed_at: Option<NaiveDateTime>,
    /// Current concentration in grains/m³ (structured source only)
    pub concentration: Option<f64>,
    /// Forward hourly concentrations (structured source only)
    pub forecast: Vec<f64>,
}

impl PollenMeasurement {
    /// Measurement from a 0-4 index
    #[must_use]
    pub fn from_index(index: u8, observed_at: Option<NaiveDateTime>) -> Self {
        let level = PollenLevel::from_index(index);
        Self {
            value: Some(level.index()),
            level,
            observed_at,
            concentration: None,
            forecast: Vec::new(),
        }
    }

    /// Measurement from a concentration and its forward slice
    #[must_use]
    pub fn from_concentration(
        grains_per_m3: f64,
        forecast: Vec<f64>,
        observed_at: Option<NaiveDateTime>,
    ) -> Self {
        let level = PollenLevel::from_concentration(grains_per_m3);
        Self {
            value: Some(level.index()),
            level,
            observed_at,
            concentration: Some(grains_per_m3),
            forecast,
        }
    }

    #[must_use]
    pub fn is_high_risk(&self) -> bool {
        self.level >= PollenLevel::High
    }
}

/// Pollen measurements for one location, keyed by species
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PollenReport {
    pub measurements: BTreeMap<PollenSpecies, PollenMeasurement>,
}

impl PollenReport {
    #[must_use]
    pub fn get(&self, species: PollenSpecies) -> Option<&PollenMeasurement> {
        self.measurements.get(&species)
    }

    pub fn insert(&mut self, species: PollenSpecies, measurement: PollenMeasurement) {
        self.measurements.insert(species, measurement);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.measurements.len()
    }
}
