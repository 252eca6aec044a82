use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use skycast_core::{AppError, RemoteError};

/// How long the service keeps a fetched record before refreshing it.
pub const SERVICE_CACHE_LIFETIME_HOURS: i64 = 1;

/// Forecast schema errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SeriesError {
    #[error("Channel {channel} has {found} values, expected {expected}")]
    LengthMismatch {
        channel: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("Unparseable timestamp: {0}")]
    BadTimestamp(String),
    #[error("Timestamps are not ascending at index {0}")]
    Unordered(usize),
}

impl From<SeriesError> for AppError {
    fn from(e: SeriesError) -> Self {
        RemoteError::InvalidResponse(e.to_string()).into()
    }
}

/// One hourly sample of a forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub time: NaiveDateTime,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub wind_direction: Option<f64>,
    pub surface_pressure: Option<f64>,
    pub dew_point: Option<f64>,
    pub precipitation_probability: Option<f64>,
}

/// Hourly forecast as parallel channels sharing one index.
///
/// Only constructible through `ForecastSeries::new`, which checks that every
/// channel has exactly one value per timestamp.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ForecastSeries {
    time: Vec<NaiveDateTime>,
    temperature: Vec<f64>,
    humidity: Vec<f64>,
    wind_speed: Vec<f64>,
    wind_direction: Vec<Option<f64>>,
    surface_pressure: Vec<Option<f64>>,
    dew_point: Vec<Option<f64>>,
    precipitation_probability: Vec<Option<f64>>,
}

/// Channels of a forecast before validation. Optional channels left as
/// `None` carry no reading at any index.
#[derive(Debug, Clone, Default)]
pub struct SeriesChannels {
    pub time: Vec<NaiveDateTime>,
    pub temperature: Vec<f64>,
    pub humidity: Vec<f64>,
    pub wind_speed: Vec<f64>,
    pub wind_direction: Option<Vec<Option<f64>>>,
    pub surface_pressure: Option<Vec<Option<f64>>>,
    pub dew_point: Option<Vec<Option<f64>>>,
    pub precipitation_probability: Option<Vec<Option<f64>>>,
}

fn check_len(channel: &'static str, expected: usize, found: usize) -> Result<(), SeriesError> {
    if expected == found {
        Ok(())
    } else {
        Err(SeriesError::LengthMismatch {
            channel,
            expected,
            found,
        })
    }
}

fn optional_channel(
    channel: &'static str,
    values: Option<Vec<Option<f64>>>,
    len: usize,
) -> Result<Vec<Option<f64>>, SeriesError> {
    match values {
        Some(values) => {
            check_len(channel, len, values.len())?;
            Ok(values)
        }
        None => Ok(vec![None; len]),
    }
}

impl ForecastSeries {
    pub fn new(channels: SeriesChannels) -> Result<Self, SeriesError> {
        let len = channels.time.len();
        check_len("temperature", len, channels.temperature.len())?;
        check_len("humidity", len, channels.humidity.len())?;
        check_len("wind_speed", len, channels.wind_speed.len())?;

        if let Some(i) = channels.time.windows(2).position(|w| w[1] < w[0]) {
            return Err(SeriesError::Unordered(i + 1));
        }

        Ok(Self {
            wind_direction: optional_channel("wind_direction", channels.wind_direction, len)?,
            surface_pressure: optional_channel("surface_pressure", channels.surface_pressure, len)?,
            dew_point: optional_channel("dew_point", channels.dew_point, len)?,
            precipitation_probability: optional_channel(
                "precipitation_probability",
                channels.precipitation_probability,
                len,
            )?,
            time: channels.time,
            temperature: channels.temperature,
            humidity: channels.humidity,
            wind_speed: channels.wind_speed,
        })
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn times(&self) -> &[NaiveDateTime] {
        &self.time
    }

    pub fn point(&self, index: usize) -> Option<ForecastPoint> {
        Some(ForecastPoint {
            time: *self.time.get(index)?,
            temperature: self.temperature[index],
            humidity: self.humidity[index],
            wind_speed: self.wind_speed[index],
            wind_direction: self.wind_direction[index],
            surface_pressure: self.surface_pressure[index],
            dew_point: self.dew_point[index],
            precipitation_probability: self.precipitation_probability[index],
        })
    }

    pub fn points(&self) -> impl Iterator<Item = ForecastPoint> + '_ {
        (0..self.len()).filter_map(|i| self.point(i))
    }
}

/// Current conditions plus forecast for one city.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub current_temperature_c: f64,
    pub humidity_pct: f64,
    pub wind_speed_kmh: f64,
    pub forecast: ForecastSeries,
    pub retrieved_at: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
}

impl WeatherSnapshot {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.valid_until
    }
}

// Wire format

/// Hourly block as sent by the service (Open-Meteo channel names).
#[derive(Debug, Clone, Deserialize)]
pub struct RawSeries {
    pub time: Vec<String>,
    pub temperature_2m: Vec<f64>,
    pub relative_humidity_2m: Vec<f64>,
    pub wind_speed_10m: Vec<f64>,
    #[serde(default)]
    pub wind_direction_10m: Option<Vec<Option<f64>>>,
    #[serde(default)]
    pub surface_pressure: Option<Vec<Option<f64>>>,
    #[serde(default)]
    pub dew_point_2m: Option<Vec<Option<f64>>>,
    #[serde(default)]
    pub precipitation_probability: Option<Vec<Option<f64>>>,
}

/// Parse a forecast timestamp.
///
/// Open-Meteo sends minute precision local times (`2024-05-01T13:00`);
/// seconds and RFC 3339 offsets are accepted as well.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, SeriesError> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.naive_local()))
        .map_err(|_| SeriesError::BadTimestamp(raw.to_string()))
}

impl TryFrom<RawSeries> for ForecastSeries {
    type Error = SeriesError;

    fn try_from(raw: RawSeries) -> Result<Self, Self::Error> {
        let time = raw
            .time
            .iter()
            .map(|t| parse_timestamp(t))
            .collect::<Result<Vec<_>, _>>()?;

        ForecastSeries::new(SeriesChannels {
            time,
            temperature: raw.temperature_2m,
            humidity: raw.relative_humidity_2m,
            wind_speed: raw.wind_speed_10m,
            wind_direction: raw.wind_direction_10m,
            surface_pressure: raw.surface_pressure,
            dew_point: raw.dew_point_2m,
            precipitation_probability: raw.precipitation_probability,
        })
    }
}

/// Record served from the service's weather cache.
#[derive(Debug, Clone, Deserialize)]
pub struct CachedWeather {
    pub city_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub forecast_data: RawSeries,
    #[serde(deserialize_with = "service_datetime")]
    pub cached_at: DateTime<Utc>,
    #[serde(deserialize_with = "service_datetime")]
    pub expiry_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LiveCurrent {
    pub temperature_2m: f64,
    pub relative_humidity_2m: f64,
    pub wind_speed_10m: f64,
}

/// Upstream payload passed through on a cache miss.
#[derive(Debug, Clone, Deserialize)]
pub struct LiveWeather {
    pub latitude: f64,
    pub longitude: f64,
    pub current: LiveCurrent,
    pub hourly: RawSeries,
}

/// Body of `GET /weather/{city}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WeatherPayload {
    Cached(CachedWeather),
    Live(LiveWeather),
}

impl WeatherPayload {
    /// Validate and normalize the payload.
    ///
    /// `requested_city` and `now` fill in what the live shape lacks.
    pub fn into_snapshot(
        self,
        requested_city: &str,
        now: DateTime<Utc>,
    ) -> Result<WeatherSnapshot, SeriesError> {
        match self {
            WeatherPayload::Cached(record) => Ok(WeatherSnapshot {
                city: record.city_name,
                latitude: record.latitude,
                longitude: record.longitude,
                current_temperature_c: record.temperature,
                humidity_pct: record.humidity,
                wind_speed_kmh: record.wind_speed,
                forecast: record.forecast_data.try_into()?,
                retrieved_at: record.cached_at,
                valid_until: record.expiry_time,
            }),
            WeatherPayload::Live(live) => {
                tracing::debug!("Service returned an uncached payload for {}", requested_city);
                Ok(WeatherSnapshot {
                    city: requested_city.to_string(),
                    latitude: live.latitude,
                    longitude: live.longitude,
                    current_temperature_c: live.current.temperature_2m,
                    humidity_pct: live.current.relative_humidity_2m,
                    wind_speed_kmh: live.current.wind_speed_10m,
                    forecast: live.hourly.try_into()?,
                    retrieved_at: now,
                    valid_until: now + Duration::hours(SERVICE_CACHE_LIFETIME_HOURS),
                })
            }
        }
    }
}

/// Service timestamps carry an offset; naive ones are taken as UTC.
pub fn service_datetime<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.and_utc())
        })
        .map_err(serde::de::Error::custom)
}
