//! Services for the SkyCast client: the REST client and the views built on
//! it (weather, search history, account, admin).

pub mod account;
pub mod admin;
pub mod client;
pub mod history;
pub mod models;
pub mod weather;

pub use account::AccountService;
pub use admin::{
    city_frequency, paginate, temperature_unit_distribution, total_pages,
    wind_speed_unit_distribution, AdminDashboard, AdminView, PageCursor,
};
pub use client::ApiClient;
pub use history::{DeleteOutcome, HistoryView};
pub use models::*;
pub use weather::{FetchOutcome, WeatherView};
