//! HTTP client for the SkyCast weather service.
//!
//! Every call takes the session token explicitly; the client holds no
//! credential of its own. Failures come back as `AppError` with 401 mapped
//! to `AuthError::Rejected`, so callers can hand them to the session.

use reqwest::header;
use serde::de::DeserializeOwned;
use skycast_core::error::ReqwestErrorExt;
use skycast_core::{ApiConfig, AppError, AuthError, RemoteError, Result, UserPreferences};
use skycast_weather::{WeatherPayload, WeatherSnapshot};
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

use crate::models::*;

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Arc<reqwest::Client>,
    base_url: String,
    auth_scheme: String,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut builder =
            reqwest::Client::builder().timeout(Duration::from_secs(config.timeout_secs));

        if cfg!(debug_assertions) && config.allow_invalid_certs {
            tracing::warn!("TLS certificate validation disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder.build().map_err(|e| e.into_app_error())?;

        Ok(Self {
            client: Arc::new(client),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_scheme: config.auth_scheme.clone(),
        })
    }

    /// Client against `base_url` with default settings.
    pub fn new_with_base_url(base_url: &str) -> Self {
        Self {
            client: Arc::new(reqwest::Client::new()),
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_scheme: "Token".to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, req: reqwest::RequestBuilder, token: &str) -> reqwest::RequestBuilder {
        req.header(
            header::AUTHORIZATION,
            format!("{} {}", self.auth_scheme, token),
        )
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        req.send().await.map_err(|e| e.into_app_error())
    }

    // Authentication

    /// Exchange email and password for a session token.
    #[instrument(skip(self, password), level = "info")]
    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let response = self
            .send(self.client.post(self.url("/token")).json(&LoginRequest {
                username: email,
                password,
            }))
            .await?;

        let status = response.status().as_u16();
        if status == 400 || status == 401 {
            tracing::info!("Login refused ({})", status);
            return Err(AuthError::InvalidCredentials.into());
        }

        let body: LoginResponse = self.handle_response(response).await?;
        if body.token.is_empty() {
            return Err(RemoteError::InvalidResponse("empty token".into()).into());
        }
        Ok(body.token)
    }

    /// Create an account. Returns the service's confirmation message.
    #[instrument(skip(self, form), fields(email = %form.email), level = "info")]
    pub async fn register(&self, form: &RegisterForm) -> Result<String> {
        let body = RegisterRequest {
            email: &form.email,
            password: &form.password,
            display_name: &form.display_name,
            preferred_temperature_unit: form.temperature_unit,
            preferred_wind_speed_unit: form.wind_speed_unit,
        };
        let response = self
            .send(self.client.post(self.url("/register")).json(&body))
            .await?;

        let resp: RegisterResponse = self.handle_response(response).await?;
        if resp.success {
            Ok(resp.message)
        } else {
            let message = if resp.message.is_empty() {
                "Registration failed. Please try again.".to_string()
            } else {
                resp.message
            };
            Err(RemoteError::Refused(message).into())
        }
    }

    // Profile

    #[instrument(skip(self, token), level = "info")]
    pub async fn get_user(&self, token: &str) -> Result<UserPreferences> {
        let response = self
            .send(self.authorized(self.client.get(self.url("/user")), token))
            .await?;
        self.handle_response(response).await
    }

    /// Update the profile. An empty `update.password` is left out.
    #[instrument(skip(self, token, update), level = "info")]
    pub async fn update_user(
        &self,
        token: &str,
        update: &ProfileUpdate,
    ) -> Result<UserPreferences> {
        let body = ProfileUpdateRequest {
            display_name: &update.display_name,
            password: Some(update.password.as_str()).filter(|p| !p.is_empty()),
            preferred_temperature_unit: update.temperature_unit,
            preferred_wind_speed_unit: update.wind_speed_unit,
        };
        let response = self
            .send(self.authorized(self.client.patch(self.url("/user")), token).json(&body))
            .await?;

        let value: serde_json::Value = self.handle_response(response).await?;
        if let Some(message) = value.get("error").and_then(|e| e.as_str()) {
            return Err(RemoteError::Refused(message.to_string()).into());
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Erase the account and all its data.
    #[instrument(skip(self, token), level = "info")]
    pub async fn delete_account(&self, token: &str) -> Result<()> {
        let response = self
            .send(self.authorized(self.client.delete(self.url("/gdpr")), token))
            .await?;
        self.handle_empty(response).await
    }

    #[instrument(skip(self, token), level = "info")]
    pub async fn get_role(&self, token: &str) -> Result<skycast_core::Role> {
        let response = self
            .send(self.authorized(self.client.get(self.url("/role")), token))
            .await?;
        let body: RoleResponse = self.handle_response(response).await?;
        Ok(body.role)
    }

    // Weather

    #[instrument(skip(self, token), level = "info")]
    pub async fn get_weather(&self, token: &str, city: &str) -> Result<WeatherSnapshot> {
        let url = self.url(&format!("/weather/{}", urlencoding::encode(city)));
        let response = self
            .send(self.authorized(self.client.get(&url), token))
            .await?;

        let payload: WeatherPayload = self.handle_response(response).await?;
        let snapshot = payload.into_snapshot(city, chrono::Utc::now())?;

        tracing::info!(
            "Fetched weather for {} ({} forecast points)",
            snapshot.city,
            snapshot.forecast.len()
        );
        Ok(snapshot)
    }

    // Search history

    #[instrument(skip(self, token), level = "info")]
    pub async fn list_history(&self, token: &str) -> Result<Vec<HistoryEntry>> {
        let response = self
            .send(self.authorized(self.client.get(self.url("/search-history")), token))
            .await?;
        self.handle_response(response).await
    }

    #[instrument(skip(self, token), level = "info")]
    pub async fn delete_history(&self, token: &str, id: i64) -> Result<()> {
        let url = self.url(&format!("/search-history/{}", id));
        let response = self
            .send(self.authorized(self.client.delete(&url), token))
            .await?;
        self.handle_empty(response).await
    }

    // Admin

    #[instrument(skip(self, token), level = "info")]
    pub async fn admin_logs(&self, token: &str) -> Result<Vec<AdminLogEntry>> {
        let response = self
            .send(self.authorized(self.client.get(self.url("/admin/api-logs")), token))
            .await?;
        self.handle_response(response).await
    }

    #[instrument(skip(self, token), level = "info")]
    pub async fn admin_users(&self, token: &str) -> Result<Vec<AdminUserRecord>> {
        let response = self
            .send(self.authorized(self.client.get(self.url("/admin/users")), token))
            .await?;
        self.handle_response(response).await
    }

    /// Drop every cached weather record on the service.
    #[instrument(skip(self, token), level = "info")]
    pub async fn clear_cache(&self, token: &str) -> Result<()> {
        let response = self
            .send(self.authorized(self.client.delete(self.url("/admin/cache")), token))
            .await?;
        self.handle_empty(response).await
    }

    #[instrument(skip(self, token), level = "info")]
    pub async fn clear_city_cache(&self, token: &str, city: &str) -> Result<()> {
        let url = self.url(&format!("/admin/cache/{}", urlencoding::encode(city)));
        let response = self
            .send(self.authorized(self.client.delete(&url), token))
            .await?;
        self.handle_empty(response).await
    }

    /// Decode a successful response, or map the failure.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            let bytes = response.bytes().await.map_err(|e| e.into_app_error())?;
            serde_json::from_slice(&bytes).map_err(|e| {
                tracing::warn!("Response did not match schema: {}", e);
                AppError::from(e)
            })
        } else {
            Err(Self::failure(response).await)
        }
    }

    /// Like `handle_response` for calls whose body is ignored.
    async fn handle_empty(&self, response: reqwest::Response) -> Result<()> {
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::failure(response).await)
        }
    }

    async fn failure(response: reqwest::Response) -> AppError {
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return AuthError::Rejected.into();
        }

        let text = response.text().await.unwrap_or_default();
        let message = error_message(&text);
        tracing::warn!("Service returned {}: {}", status, text);

        RemoteError::Status {
            status: status.as_u16(),
            message,
        }
        .into()
    }
}

/// Pull a human-readable message out of an error body.
///
/// The service reports errors as `{"error": ...}`, `{"message": ...}`,
/// `{"detail": ...}` or a list under `non_field_errors`.
fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return String::new();
    };

    for key in ["error", "message", "detail"] {
        if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
            return text.to_string();
        }
    }

    value
        .get("non_field_errors")
        .and_then(|v| v.as_array())
        .and_then(|errors| errors.first())
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use skycast_core::{NetworkError, TemperatureUnit, WindSpeedUnit};
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_login_returns_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_json(serde_json::json!({
                "username": "ada@example.com",
                "password": "hunter22"
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"token": "abc"})),
            )
            .mount(&mock_server)
            .await;

        let client = ApiClient::new_with_base_url(&mock_server.uri());
        let token = client.login("ada@example.com", "hunter22").await.unwrap();
        assert_eq!(token, "abc");
    }

    #[tokio::test]
    async fn test_login_bad_credentials() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "non_field_errors": ["Unable to log in with provided credentials."]
            })))
            .mount(&mock_server)
            .await;

        let client = ApiClient::new_with_base_url(&mock_server.uri());
        let err = client.login("ada@example.com", "wrong").await.unwrap_err();
        assert!(matches!(err, AppError::Auth(AuthError::InvalidCredentials)));
        assert!(!err.is_session_terminal());
    }

    #[tokio::test]
    async fn test_auth_header_uses_scheme() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/user"))
            .and(header("Authorization", "Token tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "email": "ada@example.com",
                "display_name": "Ada",
                "preferred_temperature_unit": 1,
                "preferred_wind_speed_unit": 0
            })))
            .mount(&mock_server)
            .await;

        let client = ApiClient::new_with_base_url(&mock_server.uri());
        let prefs = client.get_user("tok").await.unwrap();
        assert_eq!(prefs.temperature_unit, TemperatureUnit::Fahrenheit);
        assert_eq!(prefs.wind_speed_unit, WindSpeedUnit::KmPerHour);
    }

    #[tokio::test]
    async fn test_configured_scheme() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/role"))
            .and(header("Authorization", "Bearer tok"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"role": "admin"})),
            )
            .mount(&mock_server)
            .await;

        let config = ApiConfig {
            base_url: format!("{}/", mock_server.uri()),
            auth_scheme: "Bearer".into(),
            ..ApiConfig::default()
        };
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(client.get_role("tok").await.unwrap(), skycast_core::Role::Admin);
    }

    #[tokio::test]
    async fn test_unauthorized_is_rejection() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search-history"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "detail": "Invalid token."
            })))
            .mount(&mock_server)
            .await;

        let client = ApiClient::new_with_base_url(&mock_server.uri());
        let err = client.list_history("stale").await.unwrap_err();
        assert!(err.is_session_terminal());
    }

    #[tokio::test]
    async fn test_error_body_message_is_surfaced() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather/Atlantis"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": "City not found"
            })))
            .mount(&mock_server)
            .await;

        let client = ApiClient::new_with_base_url(&mock_server.uri());
        let err = client.get_weather("tok", "Atlantis").await.unwrap_err();
        match &err {
            AppError::Remote(RemoteError::Status { status, message }) => {
                assert_eq!(*status, 404);
                assert_eq!(message, "City not found");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(err.user_message(), "City not found");
    }

    #[tokio::test]
    async fn test_city_is_percent_encoded() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/admin/cache/New%20York"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": "Cache for New York cleared"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = ApiClient::new_with_base_url(&mock_server.uri());
        client.clear_city_cache("tok", "New York").await.unwrap();
    }

    #[tokio::test]
    async fn test_schema_mismatch_is_invalid_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search-history"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"results": []})),
            )
            .mount(&mock_server)
            .await;

        let client = ApiClient::new_with_base_url(&mock_server.uri());
        let err = client.list_history("tok").await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Remote(RemoteError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_update_user_error_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path("/user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "error": "Display name already taken"
            })))
            .mount(&mock_server)
            .await;

        let client = ApiClient::new_with_base_url(&mock_server.uri());
        let update = ProfileUpdate {
            display_name: "Ada".into(),
            password: String::new(),
            confirm_password: String::new(),
            temperature_unit: TemperatureUnit::Celsius,
            wind_speed_unit: WindSpeedUnit::Knots,
        };
        let err = client.update_user("tok", &update).await.unwrap_err();
        assert_eq!(err.user_message(), "Display name already taken");
    }

    #[tokio::test]
    async fn test_register_refused() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/register"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": false,
                "message": "Email already registered"
            })))
            .mount(&mock_server)
            .await;

        let client = ApiClient::new_with_base_url(&mock_server.uri());
        let form = RegisterForm {
            email: "ada@example.com".into(),
            display_name: "Ada".into(),
            password: "longenough".into(),
            confirm_password: "longenough".into(),
            temperature_unit: TemperatureUnit::Celsius,
            wind_speed_unit: WindSpeedUnit::KmPerHour,
        };
        let err = client.register(&form).await.unwrap_err();
        assert_eq!(err.user_message(), "Email already registered");
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        // Nothing listens on port 9 locally
        let client = ApiClient::new_with_base_url("http://127.0.0.1:9");
        let err = client.list_history("tok").await.unwrap_err();
        assert!(matches!(err, AppError::Network(NetworkError::ConnectionFailed(_))));
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(error_message(r#"{"error": "x"}"#), "x");
        assert_eq!(error_message(r#"{"detail": "y"}"#), "y");
        assert_eq!(error_message(r#"{"non_field_errors": ["z"]}"#), "z");
        assert_eq!(error_message("<html>"), "");
    }
}
