//! Weather condition enumeration and upstream code tables

use serde::{Deserialize, Serialize};
use std::fmt;

/// Internal weather condition shared by every forecast source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    Clear,
    MainlyClear,
    PartlyCloudy,
    Overcast,
    Fog,
    LightRain,
    Rain,
    Snow,
    Showers,
    Thunderstorm,
}

impl WeatherCondition {
    /// Map a WMO weather interpretation code
    ///
    /// Unmapped codes fall back to `PartlyCloudy`.
    #[must_use]
    pub const fn from_wmo_code(code: u16) -> Self {
        match code {
            0 => Self::Clear,
            1 => Self::MainlyClear,
            3 => Self::Overcast,
            45 | 48 => Self::Fog,
            51..=57 => Self::LightRain,
            61..=67 => Self::Rain,
            71..=77 => Self::Snow,
            80..=86 => Self::Showers,
            95..=99 => Self::Thunderstorm,
            _ => Self::PartlyCloudy,
        }
    }

    /// Map a MeteoSwiss pictogram number
    ///
    /// Night pictograms (`101..=135`) share the day table. Unmapped codes
    /// fall back to `PartlyCloudy`.
    #[must_use]
    pub const fn from_meteoswiss_icon(icon: u16) -> Self {
        let day = if icon > 100 { icon - 100 } else { icon };
        match day {
            1 => Self::Clear,
            2 | 26 => Self::MainlyClear,
            5 => Self::Overcast,
            27 | 28 => Self::Fog,
            14 | 17 | 20 | 29 => Self::LightRain,
            15 | 18 | 21 | 32 | 33 => Self::Rain,
            8 | 11 | 16 | 19 | 22 | 30 | 34 | 35 => Self::Snow,
            6 | 7 | 9 | 10 => Self::Showers,
            12 | 13 | 23 | 24 | 25 => Self::Thunderstorm,
            _ => Self::PartlyCloudy,
        }
    }

    /// Coarse condition derived only from precipitation presence
    #[must_use]
    pub fn from_precipitation(precipitation_mm: Option<f64>) -> Self {
        match precipitation_mm {
            Some(mm) if mm > 0.0 => Self::Rain,
            _ => Self::PartlyCloudy,
        }
    }

    /// Snake-case name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::MainlyClear => "mainly_clear",
            Self::PartlyCloudy => "partly_cloudy",
            Self::Overcast => "overcast",
            Self::Fog => "fog",
            Self::LightRain => "light_rain",
            Self::Rain => "rain",
            Self::Snow => "snow",
            Self::Showers => "showers",
            Self::Thunderstorm => "thunderstorm",
        }
    }
}

impl fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
