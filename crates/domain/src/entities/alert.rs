//! Weather warning entity

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Hazard category of a warning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertCategory {
    Thunderstorm,
    Rain,
    Snow,
    Wind,
    ForestFire,
    Flood,
    Other(u16),
}

impl AlertCategory {
    /// Map the upstream numeric warning type
    #[must_use]
    pub const fn from_code(code: u16) -> Self {
        match code {
            1 => Self::Thunderstorm,
            2 => Self::Rain,
            3 => Self::Snow,
            4 => Self::Wind,
            10 => Self::ForestFire,
            11 => Self::Flood,
            other => Self::Other(other),
        }
    }

    /// Upstream numeric warning type
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::Thunderstorm => 1,
            Self::Rain => 2,
            Self::Snow => 3,
            Self::Wind => 4,
            Self::ForestFire => 10,
            Self::Flood => 11,
            Self::Other(code) => *code,
        }
    }
}

impl fmt::Display for AlertCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Thunderstorm => f.write_str("Thunderstorm"),
            Self::Rain => f.write_str("Rain"),
            Self::Snow => f.write_str("Snow"),
            Self::Wind => f.write_str("Wind"),
            Self::ForestFire => f.write_str("Forest Fire"),
            Self::Flood => f.write_str("Flood"),
            Self::Other(code) => write!(f, "Unknown ({code})"),
        }
    }
}

/// Summary state of a single warning at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertState {
    Outlook,
    Critical,
    Warning,
    Clear,
}

/// An active or announced weather warning for a region
///
/// `id` is derived from region, severity, type and start time. It is not an
/// upstream identifier and two warnings sharing all four collide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherAlert {
    pub id: String,
    pub category: AlertCategory,
    /// Danger level, 1 (minor) to 5 (very high)
    pub severity: u8,
    pub title: String,
    pub description: String,
    /// Local time
    pub valid_from: Option<NaiveDateTime>,
    /// Local time
    pub valid_to: Option<NaiveDateTime>,
    pub is_outlook: bool,
}

impl WeatherAlert {
    /// Severity at or above which a warning counts as critical
    pub const CRITICAL_SEVERITY: u8 = 3;

    /// Display name of a danger level
    #[must_use]
    pub fn severity_name(level: u8) -> String {
        match level {
            1 => "Level 1 - No/minor danger".to_string(),
            2 => "Level 2 - Moderate danger".to_string(),
            3 => "Level 3 - Significant danger".to_string(),
            4 => "Level 4 - High danger".to_string(),
            5 => "Level 5 - Very high danger".to_string(),
            other => format!("Level {other}"),
        }
    }

    /// `"{type} - {level name}"`
    #[must_use]
    pub fn compose_title(category: AlertCategory, severity: u8) -> String {
        format!("{category} - {}", Self::severity_name(severity))
    }

    /// Display name of this warning's type
    #[must_use]
    pub fn type_name(&self) -> String {
        self.category.to_string()
    }

    /// Whether the warning is in force at `now`
    ///
    /// Outlooks are never active. Without an end time a warning is active.
    /// A missing start time is treated as already started.
    #[must_use]
    pub fn is_active_at(&self, now: NaiveDateTime) -> bool {
        if self.is_outlook {
            return false;
        }
        let Some(valid_to) = self.valid_to else {
            return true;
        };
        self.valid_from.is_none_or(|from| from <= now) && now <= valid_to
    }

    #[must_use]
    pub const fn is_critical(&self) -> bool {
        self.severity >= Self::CRITICAL_SEVERITY
    }

    /// Summary state at `now`
    #[must_use]
    pub fn state_at(&self, now: NaiveDateTime) -> AlertState {
        if self.is_outlook {
            AlertState::Outlook
        } else if self.is_active_at(now) {
            if self.is_critical() {
                AlertState::Critical
            } else {
                AlertState::Warning
            }
        } else {
            AlertState::Clear
        }
    }
}
