//! Account and admin flows against a mock service.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use common::*;
use skycast_auth::{AlwaysConfirm, Route};
use skycast_core::{AppError, AuthError, TemperatureUnit, ValidationError, WindSpeedUnit};
use skycast_services::{ProfileUpdate, RegisterForm};
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_login_establishes_session() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"token": "fresh"})),
        )
        .mount(&server)
        .await;

    let harness = Harness::new(&server, None);
    let account = harness.account(Arc::new(AlwaysConfirm));

    account.login(" ada@example.com ", "hunter22").await.unwrap();

    assert_eq!(harness.stored_token().as_deref(), Some("fresh"));
    assert_eq!(harness.session.require().unwrap(), "fresh");
    assert_eq!(harness.routes.last(), Some(Route::Dashboard));
}

#[tokio::test]
async fn test_login_requires_fields() {
    let server = MockServer::start().await;
    let harness = Harness::new(&server, None);
    let account = harness.account(Arc::new(AlwaysConfirm));

    let err = account.login("", "x").await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Validation(ValidationError::EmptyField("email"))
    ));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_register_routes_to_login() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/register"))
        .and(body_json(serde_json::json!({
            "email": "ada@example.com",
            "password": "longenough",
            "display_name": "Ada",
            "preferred_temperature_unit": 1,
            "preferred_wind_speed_unit": 0
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "message": "User registered successfully"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let harness = Harness::new(&server, None);
    let account = harness.account(Arc::new(AlwaysConfirm));

    let form = RegisterForm {
        email: "ada@example.com".into(),
        display_name: "Ada".into(),
        password: "longenough".into(),
        confirm_password: "longenough".into(),
        temperature_unit: TemperatureUnit::Fahrenheit,
        wind_speed_unit: WindSpeedUnit::KmPerHour,
    };
    let message = account.register(&form).await.unwrap();

    assert_eq!(message, "User registered successfully");
    assert_eq!(harness.routes.last(), Some(Route::Login));
    assert!(!harness.session.is_active());
}

#[tokio::test]
async fn test_update_profile_replaces_cached_preferences() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/user"))
        .and(body_json(serde_json::json!({
            "display_name": "Ada L.",
            "preferred_temperature_unit": 0,
            "preferred_wind_speed_unit": 1
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "email": "ada@example.com",
            "display_name": "Ada L.",
            "preferred_temperature_unit": 0,
            "preferred_wind_speed_unit": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let harness = Harness::new(&server, Some(TOKEN));
    let account = harness.account(Arc::new(AlwaysConfirm));

    let update = ProfileUpdate {
        display_name: "Ada L.".into(),
        password: String::new(),
        confirm_password: String::new(),
        temperature_unit: TemperatureUnit::Celsius,
        wind_speed_unit: WindSpeedUnit::Knots,
    };
    let prefs = account.update_profile(&update).await.unwrap();

    assert_eq!(prefs.display_name, "Ada L.");
    assert_eq!(harness.session.preferences(), Some(prefs));
}

#[tokio::test]
async fn test_password_mismatch_fails_locally() {
    let server = MockServer::start().await;
    let harness = Harness::new(&server, Some(TOKEN));
    let account = harness.account(Arc::new(AlwaysConfirm));

    let update = ProfileUpdate {
        display_name: "Ada".into(),
        password: "newpassword".into(),
        confirm_password: "typo".into(),
        temperature_unit: TemperatureUnit::Celsius,
        wind_speed_unit: WindSpeedUnit::KmPerHour,
    };
    let err = account.update_profile(&update).await.unwrap_err();

    assert!(matches!(
        err,
        AppError::Validation(ValidationError::PasswordMismatch)
    ));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_account_clears_session() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/gdpr"))
        .and(header("Authorization", "Token test_token"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let harness = Harness::new(&server, Some(TOKEN));
    let account = harness.account(Arc::new(AlwaysConfirm));

    assert!(account.delete_account().await.unwrap());
    assert!(!harness.session.is_active());
    assert_eq!(harness.stored_token(), None);
    assert_eq!(harness.routes.last(), Some(Route::Login));
}

#[tokio::test]
async fn test_delete_account_declined() {
    let server = MockServer::start().await;
    let harness = Harness::new(&server, Some(TOKEN));
    let account = harness.account(Arc::new(|_: &str| false));

    assert!(!account.delete_account().await.unwrap());
    assert!(harness.session.is_active());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_non_admin_is_routed_to_dashboard() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/role"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"role": "user"})))
        .mount(&server)
        .await;

    let harness = Harness::new(&server, Some(TOKEN));
    let admin = harness.admin();

    assert!(!admin.enter().await.unwrap());
    assert_eq!(harness.routes.last(), Some(Route::Dashboard));
    assert!(harness.session.is_active());
}

#[tokio::test]
async fn test_role_failure_is_not_a_redirect() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/role"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let harness = Harness::new(&server, Some(TOKEN));
    let err = harness.admin().enter().await.unwrap_err();

    assert!(matches!(err, AppError::Remote(_)));
    assert!(harness.routes.routes().is_empty());
}

#[tokio::test]
async fn test_admin_dashboard() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/role"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"role": "admin"})),
        )
        .mount(&server)
        .await;

    let logs: Vec<serde_json::Value> = ["Tokyo", "Tokyo", "Oslo"]
        .iter()
        .enumerate()
        .map(|(i, city)| {
            // The first row belongs to a deleted account
            let user = if i == 0 {
                serde_json::Value::Null
            } else {
                serde_json::json!(i)
            };
            serde_json::json!({
                "id": i,
                "user": user,
                "city_name": city,
                "request_time": "2024-05-01T10:00:00Z",
                "response_status": 200
            })
        })
        .collect();
    Mock::given(method("GET"))
        .and(path("/admin/api-logs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(logs))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/admin/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"email": "a@x", "display_name": "A", "preferred_temperature_unit": 0, "preferred_wind_speed_unit": 1},
            {"email": "b@x", "display_name": "B", "preferred_temperature_unit": 1, "preferred_wind_speed_unit": 1}
        ])))
        .mount(&server)
        .await;

    let harness = Harness::new(&server, Some(TOKEN));
    let admin = harness.admin();

    assert!(admin.enter().await.unwrap());
    let dashboard = admin.load_dashboard().await.unwrap();

    assert_eq!(dashboard.city_frequency["Tokyo"], 2);
    assert_eq!(dashboard.city_frequency["Oslo"], 1);
    assert_eq!(dashboard.temperature_units, Ok([1, 1]));
    assert_eq!(dashboard.wind_speed_units, Ok([0, 2]));
    assert_eq!(dashboard.logs_page().len(), 3);
    assert_eq!(dashboard.cursor.total_pages(), 1);
    assert!(dashboard.logs_on_page(2).is_empty());
}

#[tokio::test]
async fn test_clear_city_cache() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/admin/cache/Oslo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": "Cache for Oslo cleared"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let harness = Harness::new(&server, Some(TOKEN));
    harness.admin().clear_city_cache(" Oslo").await.unwrap();

    let err = harness.admin().clear_city_cache("").await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_logout_forgets_token() {
    let server = MockServer::start().await;
    let harness = Harness::new(&server, Some(TOKEN));
    let account = harness.account(Arc::new(AlwaysConfirm));

    account.logout().unwrap();

    assert_eq!(harness.stored_token(), None);
    assert!(matches!(
        harness.session.require(),
        Err(AuthError::NotAuthenticated)
    ));
}
