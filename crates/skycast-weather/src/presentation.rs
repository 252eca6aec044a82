use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use skycast_core::{TemperatureUnit, UserPreferences, WindSpeedUnit};

use crate::forecast::{bucket_days, bucket_hours};
use crate::types::{ForecastPoint, WeatherSnapshot};
use crate::units::{compass_direction, to_display_temperature, to_display_wind_speed};

/// Forecast sample converted to the user's units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayPoint {
    pub time: NaiveDateTime,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub wind_direction: Option<&'static str>,
    pub surface_pressure: Option<f64>,
    pub dew_point: Option<f64>,
    pub precipitation_probability: Option<f64>,
}

impl DisplayPoint {
    fn from_point(
        point: &ForecastPoint,
        temperature_unit: TemperatureUnit,
        wind_unit: WindSpeedUnit,
    ) -> Self {
        Self {
            time: point.time,
            temperature: to_display_temperature(point.temperature, temperature_unit),
            humidity: point.humidity,
            wind_speed: to_display_wind_speed(point.wind_speed, wind_unit),
            wind_direction: point.wind_direction.map(compass_direction),
            surface_pressure: point.surface_pressure,
            dew_point: point
                .dew_point
                .map(|d| to_display_temperature(d, temperature_unit)),
            precipitation_probability: point.precipitation_probability,
        }
    }
}

/// Everything a front-end needs to render one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherDisplay {
    pub city: String,
    pub temperature: f64,
    pub temperature_symbol: &'static str,
    pub humidity: f64,
    pub wind_speed: f64,
    pub wind_symbol: &'static str,
    pub retrieved_at: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub hourly: Vec<DisplayPoint>,
    pub daily: Vec<DisplayPoint>,
}

impl WeatherDisplay {
    /// Convert `snapshot` for display.
    ///
    /// Without preferences the default units (Celsius, km/h) are used.
    pub fn build(
        snapshot: &WeatherSnapshot,
        preferences: Option<&UserPreferences>,
        hours: usize,
        days: usize,
    ) -> Self {
        let temperature_unit = preferences.map(|p| p.temperature_unit).unwrap_or_default();
        let wind_unit = preferences.map(|p| p.wind_speed_unit).unwrap_or_default();
        let convert = |p: &ForecastPoint| DisplayPoint::from_point(p, temperature_unit, wind_unit);

        Self {
            city: snapshot.city.clone(),
            temperature: to_display_temperature(snapshot.current_temperature_c, temperature_unit),
            temperature_symbol: temperature_unit.symbol(),
            humidity: snapshot.humidity_pct,
            wind_speed: to_display_wind_speed(snapshot.wind_speed_kmh, wind_unit),
            wind_symbol: wind_unit.symbol(),
            retrieved_at: snapshot.retrieved_at,
            valid_until: snapshot.valid_until,
            hourly: bucket_hours(&snapshot.forecast, hours).iter().map(convert).collect(),
            daily: bucket_days(&snapshot.forecast, days).iter().map(convert).collect(),
        }
    }
}
