//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use skycast_auth::{
    AlwaysConfirm, Confirmer, CredentialStore, MemoryCredentialStore, RouteLog, SessionContext,
    SESSION_KEY,
};
use skycast_core::DisplayConfig;
use skycast_services::{AccountService, AdminView, ApiClient, HistoryView, WeatherView};
use std::sync::Arc;
use wiremock::MockServer;

pub const TOKEN: &str = "test_token";

pub struct Harness {
    pub api: Arc<ApiClient>,
    pub store: Arc<MemoryCredentialStore>,
    pub routes: Arc<RouteLog>,
    pub session: Arc<SessionContext>,
}

impl Harness {
    /// Client against `server` with `token` already persisted.
    pub fn new(server: &MockServer, token: Option<&str>) -> Self {
        let store = Arc::new(MemoryCredentialStore::default());
        if let Some(token) = token {
            store.store(SESSION_KEY, token).unwrap();
        }
        let routes = Arc::new(RouteLog::default());
        let session = Arc::new(SessionContext::restore(store.clone(), routes.clone()).unwrap());

        Self {
            api: Arc::new(ApiClient::new_with_base_url(&server.uri())),
            store,
            routes,
            session,
        }
    }

    pub fn history(&self, confirmer: Arc<dyn Confirmer>) -> Arc<HistoryView> {
        Arc::new(HistoryView::new(
            self.api.clone(),
            self.session.clone(),
            confirmer,
        ))
    }

    pub fn weather(&self) -> Arc<WeatherView> {
        Arc::new(WeatherView::new(
            self.api.clone(),
            self.session.clone(),
            self.history(Arc::new(AlwaysConfirm)),
            DisplayConfig::default(),
        ))
    }

    pub fn account(&self, confirmer: Arc<dyn Confirmer>) -> AccountService {
        AccountService::new(self.api.clone(), self.session.clone(), confirmer)
    }

    pub fn admin(&self) -> AdminView {
        AdminView::new(self.api.clone(), self.session.clone(), 10)
    }

    pub fn stored_token(&self) -> Option<String> {
        self.store.load(SESSION_KEY).unwrap()
    }
}

pub fn user_json() -> serde_json::Value {
    serde_json::json!({
        "email": "ada@example.com",
        "display_name": "Ada",
        "preferred_temperature_unit": 1,
        "preferred_wind_speed_unit": 1
    })
}

/// Cached weather record for `city`, 30 hourly points from midnight.
pub fn weather_json(city: &str, temperature: f64) -> serde_json::Value {
    let time: Vec<String> = (0..30)
        .map(|h| format!("2024-05-{:02}T{:02}:00", 1 + h / 24, h % 24))
        .collect();
    serde_json::json!({
        "city_name": city,
        "latitude": 59.91,
        "longitude": 10.75,
        "temperature": temperature,
        "humidity": 70,
        "wind_speed": 10.0,
        "forecast_data": {
            "time": time,
            "temperature_2m": vec![temperature; 30],
            "relative_humidity_2m": vec![70; 30],
            "wind_speed_10m": vec![10.0; 30]
        },
        "cached_at": "2024-05-01T00:00:00Z",
        "expiry_time": "2024-05-01T01:00:00Z"
    })
}

pub fn history_json(entries: &[(i64, &str)]) -> serde_json::Value {
    serde_json::Value::Array(
        entries
            .iter()
            .map(|(id, city)| {
                serde_json::json!({
                    "id": id,
                    "city_name": city,
                    "search_time": "2024-05-01T10:00:00Z"
                })
            })
            .collect(),
    )
}
