//! API integration tests against the in-memory backend

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{NaiveTime, TimeZone, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use salon_server::{
    api,
    config::AppConfig,
    models::{
        schedule::Weekday,
        user::{Role, UserClaims},
    },
    repository::{memory::MemoryStore, Repository},
    services::{clock::FixedClock, Services},
    AppState,
};

struct TestApp {
    router: Router,
    store: Arc<MemoryStore>,
    secret: String,
    tenant: Uuid,
    stylist: Uuid,
    employee: Uuid,
    client: Uuid,
    cut: Uuid,
}

/// Stylist working Monday and Tuesday 09:00-18:00; "now" is Sunday 2030-01-06 12:00Z
async fn spawn_app() -> TestApp {
    let config = AppConfig::default();
    let store = Arc::new(MemoryStore::new());
    let tenant = Uuid::new_v4();

    let profile = store.add_stylist(tenant, "Jo", true).await;
    let employee = profile.employee_id.unwrap();
    for day in [Weekday::Monday, Weekday::Tuesday] {
        store
            .add_window(
                tenant,
                employee,
                day,
                NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            )
            .await
            .unwrap();
    }
    let client = store.add_client(tenant, "Ada", Some("555-0101")).await;
    let cut = store.add_service(tenant, "Cut").await;
    store.offer_service(tenant, profile.stylist_id, cut, 45).await;

    let clock = Arc::new(FixedClock(Utc.with_ymd_and_hms(2030, 1, 6, 12, 0, 0).unwrap()));
    let services = Services::new(Repository::in_memory(store.clone()), &config.booking, clock);
    let secret = config.auth.jwt_secret.clone();
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    TestApp {
        router: api::create_router(state),
        store,
        secret,
        tenant,
        stylist: profile.stylist_id,
        employee,
        client,
        cut,
    }
}

impl TestApp {
    fn token(&self, role: Role) -> String {
        self.token_for(self.tenant, role)
    }

    fn token_for(&self, tenant_id: Uuid, role: Role) -> String {
        let now = Utc::now().timestamp();
        UserClaims {
            sub: "frontdesk".to_string(),
            user_id: Uuid::new_v4(),
            tenant_id,
            role,
            exp: now + 3600,
            iat: now,
        }
        .create_token(&self.secret)
        .unwrap()
    }

    async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn book(&self, token: &str, date_time: &str) -> (StatusCode, Value) {
        self.send(
            Method::POST,
            "/api/v1/appointments",
            Some(token),
            Some(json!({
                "client_id": self.client,
                "stylist_id": self.stylist,
                "service_id": self.cut,
                "date_time": date_time,
                "description": "first visit"
            })),
        )
        .await
    }
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;
    let (status, body) = app.send(Method::GET, "/api/v1/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_requests_without_token_are_rejected() {
    let app = spawn_app().await;
    let (status, body) = app.send(Method::GET, "/api/v1/appointments", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "NotAuthorized");
}

#[tokio::test]
async fn test_book_and_slot_leaves_availability() {
    let app = spawn_app().await;
    let token = app.token(Role::Receptionist);

    let (status, body) = app.book(&token, "2030-01-08T10:00:00Z").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "scheduled");
    assert!(body.get("tenant_id").is_none());

    let uri = format!("/api/v1/stylists/{}/availability?date=2030-01-08", app.stylist);
    let (status, body) = app.send(Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let slots = body["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 17);
    assert!(slots.iter().all(|s| s["date_time"] != "2030-01-08T10:00:00Z"));
}

#[tokio::test]
async fn test_double_booking_is_conflict() {
    let app = spawn_app().await;
    let token = app.token(Role::Receptionist);

    let (status, first) = app.book(&token, "2030-01-08T10:00:00Z").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.book(&token, "2030-01-08T10:00:00Z").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "SlotConflict");
    assert!(body["message"].as_str().unwrap().contains(first["id"].as_str().unwrap()));
}

#[tokio::test]
async fn test_booking_outside_hours_names_the_windows() {
    let app = spawn_app().await;
    let token = app.token(Role::Receptionist);

    let (status, body) = app.book(&token, "2030-01-07T19:00:00Z").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "OutsideWorkingHours");
    assert!(body["message"].as_str().unwrap().contains("09:00-18:00"));
}

#[tokio::test]
async fn test_past_booking_is_rejected() {
    let app = spawn_app().await;
    let token = app.token(Role::Receptionist);

    let (status, body) = app.book(&token, "2029-12-31T10:00:00Z").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "PastDateRejected");
}

#[tokio::test]
async fn test_stylist_without_employee_profile() {
    let app = spawn_app().await;
    let token = app.token(Role::Receptionist);
    let bare = app.store.add_stylist(app.tenant, "Sam", false).await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/appointments",
            Some(&token),
            Some(json!({
                "client_id": app.client,
                "stylist_id": bare.stylist_id,
                "date_time": "2030-01-08T10:00:00Z"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "EmployeeProfileMissing");
}

#[tokio::test]
async fn test_lifecycle_over_http() {
    let app = spawn_app().await;
    let token = app.token(Role::Stylist);

    let (_, created) = app.book(&token, "2030-01-08T10:00:00Z").await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, moved) = app
        .send(
            Method::POST,
            &format!("/api/v1/appointments/{}/reschedule", id),
            Some(&token),
            Some(json!({ "date_time": "2030-01-08T15:30:00Z" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(moved["date_time"], "2030-01-08T15:30:00Z");

    let sale = Uuid::new_v4();
    let (status, done) = app
        .send(
            Method::POST,
            &format!("/api/v1/appointments/{}/complete", id),
            Some(&token),
            Some(json!({ "sale_id": sale })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(done["status"], "completed");
    assert_eq!(done["sale_id"], sale.to_string());
    assert!(app.store.client_last_visit(app.tenant, app.client).await.is_some());

    let (status, body) = app
        .send(Method::POST, &format!("/api/v1/appointments/{}/complete", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "AlreadyCompleted");

    let (status, body) = app
        .send(Method::POST, &format!("/api/v1/appointments/{}/cancel", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "InvalidTransition");
}

#[tokio::test]
async fn test_cancel_twice_over_http() {
    let app = spawn_app().await;
    let token = app.token(Role::Receptionist);
    let (_, created) = app.book(&token, "2030-01-07T09:00:00Z").await;
    let uri = format!("/api/v1/appointments/{}/cancel", created["id"].as_str().unwrap());

    let (status, cancelled) = app.send(Method::POST, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["status"], "cancelled");

    let (status, body) = app.send(Method::POST, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "AlreadyCancelled");

    let read_uri = format!("/api/v1/appointments/{}", created["id"].as_str().unwrap());
    let (status, stored) = app.send(Method::GET, &read_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored["status"], "cancelled");
    assert_eq!(stored["updated_at"], cancelled["updated_at"]);
}

#[tokio::test]
async fn test_calendar_feed() {
    let app = spawn_app().await;
    let token = app.token(Role::Manager);
    app.book(&token, "2030-01-08T10:00:00Z").await;

    let (status, body) = app
        .send(
            Method::GET,
            "/api/v1/calendar?start=2030-01-08T00:00:00Z&end=2030-01-09T00:00:00Z",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let events = body.as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["title"], "Ada");
    assert_eq!(events[0]["end"], "2030-01-08T10:45:00Z");
    assert_eq!(events[0]["color"], "#3788d8");
    assert_eq!(events[0]["extendedProps"]["notes"], "first visit");

    let (status, _) = app
        .send(
            Method::GET,
            "/api/v1/calendar?start=2030-01-09T00:00:00Z&end=2030-01-08T00:00:00Z",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_tenants_are_isolated() {
    let app = spawn_app().await;
    let (_, created) = app.book(&app.token(Role::Receptionist), "2030-01-08T10:00:00Z").await;

    let stranger = app.token_for(Uuid::new_v4(), Role::Admin);
    let (status, _) = app
        .send(
            Method::GET,
            &format!("/api/v1/appointments/{}", created["id"].as_str().unwrap()),
            Some(&stranger),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_schedule_windows_require_manager() {
    let app = spawn_app().await;
    let uri = format!("/api/v1/employees/{}/schedule-windows", app.employee);
    let window = json!({ "day_of_week": "saturday", "start_time": "10:00", "end_time": "14:00" });

    let (status, _) = app
        .send(Method::POST, &uri, Some(&app.token(Role::Stylist)), Some(window.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let manager = app.token(Role::Manager);
    let (status, created) = app.send(Method::POST, &uri, Some(&manager), Some(window)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["day_of_week"], "saturday");

    // Saturday is now bookable
    let (status, _) = app.book(&manager, "2030-01-12T10:30:00Z").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/api/v1/schedule-windows/{}", created["id"].as_str().unwrap()),
            Some(&manager),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_availability_on_day_off() {
    let app = spawn_app().await;
    let token = app.token(Role::Receptionist);
    let uri = format!("/api/v1/stylists/{}/availability?date=2030-01-10", app.stylist);

    let (status, body) = app.send(Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["slots"].as_array().unwrap().is_empty());
    assert_eq!(body["message"], "Stylist does not work on thursday");

    let bad = format!("/api/v1/stylists/{}/availability?date=10/01/2030", app.stylist);
    let (status, _) = app.send(Method::GET, &bad, Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
