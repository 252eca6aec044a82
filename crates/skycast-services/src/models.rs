//! Request and response bodies of the weather service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skycast_core::{TemperatureUnit, WindSpeedUnit};
use skycast_weather::types::service_datetime;

/// One past search, as listed by `GET /search-history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    #[serde(rename = "city_name")]
    pub city: String,
    #[serde(rename = "search_time", deserialize_with = "service_datetime")]
    pub searched_at: DateTime<Utc>,
}

/// User an API log row is attributed to.
///
/// The service sends the user's primary key or, depending on the
/// serializer, a readable identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActingUser {
    Id(i64),
    Name(String),
}

impl std::fmt::Display for ActingUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActingUser::Id(id) => write!(f, "#{}", id),
            ActingUser::Name(name) => f.write_str(name),
        }
    }
}

/// Row of `GET /admin/api-logs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminLogEntry {
    pub id: i64,
    /// `None` once the account was deleted
    #[serde(rename = "user", default)]
    pub acting_user: Option<ActingUser>,
    #[serde(rename = "city_name")]
    pub city: String,
    #[serde(rename = "request_time", deserialize_with = "service_datetime")]
    pub requested_at: DateTime<Utc>,
    pub response_status: u16,
}

/// Row of `GET /admin/users`.
///
/// Unit fields stay optional here so the reducer can report users that lack
/// them instead of silently counting them as the default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminUserRecord {
    pub email: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(rename = "preferred_temperature_unit", default)]
    pub temperature_unit: Option<TemperatureUnit>,
    #[serde(rename = "preferred_wind_speed_unit", default)]
    pub wind_speed_unit: Option<WindSpeedUnit>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LoginResponse {
    pub token: String,
}

/// Sign-up form.
#[derive(Debug, Clone)]
pub struct RegisterForm {
    pub email: String,
    pub display_name: String,
    pub password: String,
    pub confirm_password: String,
    pub temperature_unit: TemperatureUnit,
    pub wind_speed_unit: WindSpeedUnit,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct RegisterRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub display_name: &'a str,
    pub preferred_temperature_unit: TemperatureUnit,
    pub preferred_wind_speed_unit: WindSpeedUnit,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RegisterResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

/// Profile edit. An empty password leaves the password unchanged.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub display_name: String,
    pub password: String,
    pub confirm_password: String,
    pub temperature_unit: TemperatureUnit,
    pub wind_speed_unit: WindSpeedUnit,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ProfileUpdateRequest<'a> {
    pub display_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<&'a str>,
    pub preferred_temperature_unit: TemperatureUnit,
    pub preferred_wind_speed_unit: WindSpeedUnit,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RoleResponse {
    pub role: skycast_core::Role,
}
