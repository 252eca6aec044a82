//! Weather retrieval controller.
//!
//! One `WeatherView` per screen. Fetches are latest-wins: each issues a
//! ticket from the view's `RequestSequence` and its result is applied only
//! while that ticket is still current. A failed fetch leaves the previous
//! snapshot in place.

use parking_lot::Mutex;
use skycast_auth::SessionContext;
use skycast_core::{DisplayConfig, RequestSequence, Result, Ticket, UserPreferences, ValidationError};
use skycast_weather::{WeatherDisplay, WeatherSnapshot};
use std::sync::Arc;

use crate::client::ApiClient;
use crate::history::HistoryView;

/// Longest city name the service accepts.
pub const MAX_CITY_LEN: usize = 100;

/// What became of a fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Applied(WeatherSnapshot),
    /// A newer fetch was issued, or the view was left, before this one returned
    Superseded,
}

#[derive(Debug, Default)]
struct WeatherState {
    snapshot: Option<WeatherSnapshot>,
    error: Option<String>,
    loading: bool,
}

pub struct WeatherView {
    api: Arc<ApiClient>,
    session: Arc<SessionContext>,
    history: Arc<HistoryView>,
    display: DisplayConfig,
    seq: RequestSequence,
    state: Mutex<WeatherState>,
}

/// Trim and check a city typed by the user.
pub fn validate_city(input: &str) -> std::result::Result<&str, ValidationError> {
    let city = input.trim();
    if city.is_empty() {
        return Err(ValidationError::EmptyField("city"));
    }
    if city.chars().count() > MAX_CITY_LEN {
        return Err(ValidationError::TooLong {
            field: "city",
            max: MAX_CITY_LEN,
        });
    }
    Ok(city)
}

impl WeatherView {
    pub fn new(
        api: Arc<ApiClient>,
        session: Arc<SessionContext>,
        history: Arc<HistoryView>,
        display: DisplayConfig,
    ) -> Self {
        Self {
            api,
            session,
            history,
            display,
            seq: RequestSequence::new(),
            state: Mutex::new(WeatherState::default()),
        }
    }

    pub fn snapshot(&self) -> Option<WeatherSnapshot> {
        self.state.lock().snapshot.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().loading
    }

    /// Current snapshot converted to the user's units.
    pub fn display(&self) -> Option<WeatherDisplay> {
        let snapshot = self.snapshot()?;
        let preferences = self.session.preferences();
        Some(WeatherDisplay::build(
            &snapshot,
            preferences.as_ref(),
            self.display.forecast_hours,
            self.display.forecast_days,
        ))
    }

    /// Fetch weather for `city` and make it the current snapshot.
    pub async fn fetch_weather(&self, city: &str) -> Result<FetchOutcome> {
        let city = match validate_city(city) {
            Ok(city) => city,
            Err(e) => {
                self.state.lock().error = Some(e.user_message());
                return Err(e.into());
            }
        };

        let token = self.session.require()?;
        let ticket = self.seq.issue();
        self.state.lock().loading = true;

        self.ensure_preferences(&token).await?;

        let result = self.api.get_weather(&token, city).await;

        if let Err(e) = &result {
            self.session.handle_failure(&token, e);
        }

        let snapshot = match self.commit(ticket, city, result) {
            Some(result) => result?,
            None => {
                tracing::debug!("Dropping superseded weather response for {}", city);
                return Ok(FetchOutcome::Superseded);
            }
        };

        // The service records the search; pull the updated list.
        if let Err(e) = self.history.refresh().await {
            tracing::warn!("History refresh after search failed: {}", e);
        }

        Ok(FetchOutcome::Applied(snapshot))
    }

    /// Apply a fetch result if `ticket` is still current.
    ///
    /// The currency check and the write happen under the state lock, so an
    /// older response can never overwrite a newer one. `None` means the
    /// result was superseded and left no trace.
    fn commit(
        &self,
        ticket: Ticket,
        city: &str,
        result: Result<WeatherSnapshot>,
    ) -> Option<Result<WeatherSnapshot>> {
        let mut state = self.state.lock();
        if !self.seq.is_current(ticket) {
            return None;
        }

        state.loading = false;
        match result {
            Ok(snapshot) => {
                state.snapshot = Some(snapshot.clone());
                state.error = None;
                Some(Ok(snapshot))
            }
            Err(e) => {
                tracing::warn!("Weather fetch for {} failed: {}", city, e);
                state.error = Some(e.user_message());
                Some(Err(e))
            }
        }
    }

    /// Load preferences once per session.
    ///
    /// Only a rejected credential is fatal; other failures fall back to the
    /// default units.
    async fn ensure_preferences(&self, token: &str) -> Result<Option<UserPreferences>> {
        if let Some(preferences) = self.session.preferences() {
            return Ok(Some(preferences));
        }

        match self.api.get_user(token).await {
            Ok(preferences) => {
                self.session.cache_preferences(token, preferences.clone());
                Ok(Some(preferences))
            }
            Err(e) if e.is_session_terminal() => {
                self.session.handle_failure(token, &e);
                self.state.lock().loading = false;
                Err(e)
            }
            Err(e) => {
                tracing::warn!("Could not load preferences, using defaults: {}", e);
                Ok(None)
            }
        }
    }

    /// Navigate away: late responses are ignored from now on.
    pub fn leave(&self) {
        let mut state = self.state.lock();
        self.seq.abandon();
        state.loading = false;
        drop(state);
        self.history.leave();
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn test_validate_city() {
        assert_eq!(validate_city("  Oslo "), Ok("Oslo"));
        assert_eq!(
            validate_city("   "),
            Err(ValidationError::EmptyField("city"))
        );
        let long = "x".repeat(MAX_CITY_LEN + 1);
        assert!(matches!(
            validate_city(&long),
            Err(ValidationError::TooLong { .. })
        ));
        assert!(validate_city(&"x".repeat(MAX_CITY_LEN)).is_ok());
    }

    fn view() -> WeatherView {
        let api = Arc::new(ApiClient::new_with_base_url("http://127.0.0.1:9"));
        let session = Arc::new(SessionContext::new(
            Arc::new(skycast_auth::MemoryCredentialStore::default()),
            Arc::new(skycast_auth::RouteLog::default()),
        ));
        let history = Arc::new(HistoryView::new(
            api.clone(),
            session.clone(),
            Arc::new(skycast_auth::AlwaysConfirm),
        ));
        WeatherView::new(api, session, history, DisplayConfig::default())
    }

    fn snapshot(city: &str) -> WeatherSnapshot {
        let now = chrono::Utc::now();
        WeatherSnapshot {
            city: city.to_string(),
            latitude: 0.0,
            longitude: 0.0,
            current_temperature_c: 10.0,
            humidity_pct: 50.0,
            wind_speed_kmh: 5.0,
            forecast: skycast_weather::ForecastSeries::new(
                skycast_weather::SeriesChannels::default(),
            )
            .unwrap(),
            retrieved_at: now,
            valid_until: now,
        }
    }

    #[test]
    fn test_older_result_never_overwrites_newer() {
        let view = view();
        let older = view.seq.issue();
        let newer = view.seq.issue();

        let applied = view.commit(newer, "Fast", Ok(snapshot("Fast")));
        assert!(matches!(applied, Some(Ok(ref s)) if s.city == "Fast"));

        assert!(view.commit(older, "Slow", Ok(snapshot("Slow"))).is_none());
        assert!(view
            .commit(older, "Slow", Err(ValidationError::EmptyField("city").into()))
            .is_none());

        assert_eq!(view.snapshot().unwrap().city, "Fast");
        assert!(view.error().is_none());
    }

    #[test]
    fn test_commit_after_leave_is_dropped() {
        let view = view();
        let ticket = view.seq.issue();
        view.leave();

        assert!(view.commit(ticket, "Oslo", Ok(snapshot("Oslo"))).is_none());
        assert!(view.snapshot().is_none());
        assert!(!view.is_loading());
    }
}
