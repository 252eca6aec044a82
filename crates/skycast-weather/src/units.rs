//! Unit preference adapter.
//!
//! The service always reports Celsius and km/h. These functions convert to
//! and from the user's preferred units for display. A missing preference
//! (`None`) means the default unit, so every function is total.

use skycast_core::{TemperatureUnit, WindSpeedUnit};

const KMH_TO_KNOTS: f64 = 0.539957;

const COMPASS_LABELS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Celsius reading in the preferred unit, rounded to 2 decimals.
pub fn to_display_temperature(celsius: f64, unit: impl Into<Option<TemperatureUnit>>) -> f64 {
    match unit.into().unwrap_or_default() {
        TemperatureUnit::Celsius => round2(celsius),
        TemperatureUnit::Fahrenheit => round2(celsius * 9.0 / 5.0 + 32.0),
    }
}

/// Inverse of [`to_display_temperature`], for values the user typed in.
pub fn from_display_temperature(value: f64, unit: impl Into<Option<TemperatureUnit>>) -> f64 {
    match unit.into().unwrap_or_default() {
        TemperatureUnit::Celsius => round2(value),
        TemperatureUnit::Fahrenheit => round2((value - 32.0) * 5.0 / 9.0),
    }
}

/// km/h reading in the preferred unit, rounded to 2 decimals.
pub fn to_display_wind_speed(kmh: f64, unit: impl Into<Option<WindSpeedUnit>>) -> f64 {
    match unit.into().unwrap_or_default() {
        WindSpeedUnit::KmPerHour => round2(kmh),
        WindSpeedUnit::Knots => round2(kmh * KMH_TO_KNOTS),
    }
}

pub fn from_display_wind_speed(value: f64, unit: impl Into<Option<WindSpeedUnit>>) -> f64 {
    match unit.into().unwrap_or_default() {
        WindSpeedUnit::KmPerHour => round2(value),
        WindSpeedUnit::Knots => round2(value / KMH_TO_KNOTS),
    }
}

/// Eight-point compass label for a bearing in degrees.
///
/// Each label owns the 45 degree sector starting at its bearing, so 44 is
/// still north and 45 is the first north-east bearing. Any finite bearing is
/// accepted; it is normalized into `[0, 360)` first, so 360 and -360 both
/// read as north.
pub fn compass_direction(degrees: f64) -> &'static str {
    let normalized = degrees.rem_euclid(360.0);
    let sector = (normalized / 45.0).floor() as usize % COMPASS_LABELS.len();
    COMPASS_LABELS[sector]
}
