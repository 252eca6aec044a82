//! Weather data for SkyCast
//!
//! Snapshot and forecast schema as served by the weather service, the unit
//! adapter, and the forecast bucketing used by the views.

pub mod forecast;
pub mod presentation;
pub mod types;
pub mod units;

pub use forecast::{bucket_days, bucket_hours};
pub use presentation::{DisplayPoint, WeatherDisplay};
pub use types::*;
pub use units::{
    compass_direction, from_display_temperature, from_display_wind_speed, to_display_temperature,
    to_display_wind_speed,
};
