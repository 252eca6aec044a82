//! User preference model shared by the session, the unit adapter and the
//! admin reducer.
//!
//! Units travel over the wire as their ordinal (`0`/`1`); an ordinal outside
//! that range is rejected at deserialization time.

use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

/// Temperature unit preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub const ALL: [TemperatureUnit; 2] = [TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit];

    pub fn ordinal(self) -> usize {
        match self {
            Self::Celsius => 0,
            Self::Fahrenheit => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Celsius => "Celsius",
            Self::Fahrenheit => "Fahrenheit",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Celsius => "°C",
            Self::Fahrenheit => "°F",
        }
    }
}

impl TryFrom<u8> for TemperatureUnit {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Celsius),
            1 => Ok(Self::Fahrenheit),
            other => Err(format!("unknown temperature unit ordinal {}", other)),
        }
    }
}

impl From<TemperatureUnit> for u8 {
    fn from(unit: TemperatureUnit) -> Self {
        unit.ordinal() as u8
    }
}

impl FromStr for TemperatureUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "0" | "c" | "celsius" => Ok(Self::Celsius),
            "1" | "f" | "fahrenheit" => Ok(Self::Fahrenheit),
            other => Err(format!("unknown temperature unit: {}", other)),
        }
    }
}

/// Wind speed unit preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum WindSpeedUnit {
    #[default]
    KmPerHour,
    Knots,
}

impl WindSpeedUnit {
    pub const ALL: [WindSpeedUnit; 2] = [WindSpeedUnit::KmPerHour, WindSpeedUnit::Knots];

    pub fn ordinal(self) -> usize {
        match self {
            Self::KmPerHour => 0,
            Self::Knots => 1,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::KmPerHour => "km/h",
            Self::Knots => "kn",
        }
    }
}

impl TryFrom<u8> for WindSpeedUnit {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::KmPerHour),
            1 => Ok(Self::Knots),
            other => Err(format!("unknown wind speed unit ordinal {}", other)),
        }
    }
}

impl From<WindSpeedUnit> for u8 {
    fn from(unit: WindSpeedUnit) -> Self {
        unit.ordinal() as u8
    }
}

impl FromStr for WindSpeedUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "0" | "kmh" | "km/h" | "kph" => Ok(Self::KmPerHour),
            "1" | "kn" | "kt" | "knots" => Ok(Self::Knots),
            other => Err(format!("unknown wind speed unit: {}", other)),
        }
    }
}

/// Account role. Anything other than `"admin"` is a regular user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        if value.eq_ignore_ascii_case("admin") {
            Role::Admin
        } else {
            Role::User
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::User => "user".to_string(),
            Role::Admin => "admin".to_string(),
        }
    }
}

/// Preferences of the signed-in user, as returned by `GET /user`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    #[serde(default)]
    pub email: Option<String>,
    pub display_name: String,
    #[serde(
        rename = "preferred_temperature_unit",
        default,
        deserialize_with = "null_as_default"
    )]
    pub temperature_unit: TemperatureUnit,
    #[serde(
        rename = "preferred_wind_speed_unit",
        default,
        deserialize_with = "null_as_default"
    )]
    pub wind_speed_unit: WindSpeedUnit,
    #[serde(default)]
    pub role: Role,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
