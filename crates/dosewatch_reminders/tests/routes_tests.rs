
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::Duration;
use dosewatch_reminders::routes;
use fixtures::{base_time, harness, medication, profile, subscription, Harness};
use std::sync::Arc;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn app(h: &Harness) -> Router {
    routes(h.ctx.clone())
}

#[tokio::test]
async fn test_create_medication_parses_once_daily() {
    let h = harness().await;
    let (status, body) = send(
        app(&h),
        "POST",
        "/medications",
        Some(json!({
            "user_id": "u1",
            "name": "Metformin",
            "dosage": "500mg",
            "frequency": "Once daily",
            "time_of_day": ["08:00"]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["interval_hours"], 24);
    assert_eq!(body["frequency"], "Once daily");
    assert_eq!(body["reminder_enabled"], true);

    let id = body["id"].as_str().unwrap().to_string();
    let (status, listed) = send(app(&h), "GET", "/medications?user_id=u1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["id"], id.as_str());
}

#[tokio::test]
async fn test_create_medication_rejects_unknown_frequency() {
    let h = harness().await;
    let (status, body) = send(
        app(&h),
        "POST",
        "/medications",
        Some(json!({
            "user_id": "u1",
            "name": "Metformin",
            "dosage": "500mg",
            "frequency": "whenever"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 400);
}

#[tokio::test]
async fn test_update_and_delete_medication() {
    let h = harness().await;
    h.seed_medication(&medication("m1", "u1", 12, Some(base_time()))).await;

    let (status, body) = send(
        app(&h),
        "PUT",
        "/medications/m1",
        Some(json!({ "interval_hours": 6, "reminder_enabled": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["interval_hours"], 6);
    assert_eq!(body["frequency"], "Every 6 hours");
    assert_eq!(body["reminder_enabled"], false);

    let (status, _) = send(app(&h), "DELETE", "/medications/m1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(app(&h), "GET", "/medications/m1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], 404);
}

#[tokio::test]
async fn test_dispatch_endpoint_reports_cycle() {
    let h = harness().await;
    h.seed_profile(&profile("u1", true, false, false)).await;
    h.seed_medication(&medication("m1", "u1", 12, Some(base_time()))).await;

    let (status, body) = send(app(&h), "POST", "/reminders/dispatch", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["claimed"], 1);
    assert_eq!(body["succeeded"], 1);
    assert_eq!(h.email.sent().len(), 1);
}

#[tokio::test]
async fn test_snooze_endpoint() {
    let h = harness().await;
    h.seed_medication(&medication("m1", "u1", 12, Some(base_time()))).await;

    let (status, body) = send(
        app(&h),
        "POST",
        "/reminders/snooze",
        Some(json!({ "medicationId": "m1", "duration": 3 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(
        h.next_reminder("m1").await,
        Some(base_time() + Duration::hours(3))
    );

    let (status, _) = send(
        app(&h),
        "POST",
        "/reminders/snooze",
        Some(json!({ "medicationId": "nope", "duration": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        app(&h),
        "POST",
        "/reminders/snooze",
        Some(json!({ "medicationId": "m1", "duration": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_database_failures_are_internal_errors() {
    let h = harness().await;
    h.seed_medication(&medication("m1", "u1", 12, Some(base_time()))).await;

    h.execute("DROP TABLE reminder_history").await;
    let (status, body) = send(
        app(&h),
        "POST",
        "/reminders/snooze",
        Some(json!({ "medicationId": "m1", "duration": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], 500);

    h.execute("DROP TABLE medications").await;
    let (status, body) = send(app(&h), "POST", "/reminders/dispatch", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], 500);
}

#[tokio::test]
async fn test_snooze_link_without_signer_is_unauthorized() {
    let h = harness().await;
    let (status, body) = send(
        app(&h),
        "GET",
        "/reminders/snooze-link?medication_id=m1&hours=1&expires=9999999999&signature=abcd",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], 401);
}

#[tokio::test]
async fn test_history_endpoint_filters_by_medication() {
    let h = harness().await;
    h.seed_profile(&profile("u1", true, false, false)).await;
    h.seed_medication(&medication("m1", "u1", 12, Some(base_time()))).await;
    h.seed_medication(&medication("m2", "u1", 12, Some(base_time()))).await;
    send(app(&h), "POST", "/reminders/dispatch", None).await;

    let (status, body) = send(app(&h), "GET", "/reminders/history?medication_id=m2", None).await;

    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["medication_id"], "m2");
    assert_eq!(rows[0]["type"], "email");
    assert_eq!(rows[0]["status"], "success");
}

#[tokio::test]
async fn test_profile_upsert_and_get() {
    let h = harness().await;

    let (status, _) = send(app(&h), "GET", "/profiles/u9", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        app(&h),
        "PUT",
        "/profiles/u9",
        Some(json!({ "email": "lee@example.com", "email_reminder_enabled": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "lee@example.com");
    assert_eq!(body["push_reminder_enabled"], true);
    assert_eq!(body["sms_reminder_enabled"], false);

    let (status, body) = send(app(&h), "GET", "/profiles/u9", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email_reminder_enabled"], true);

    let (status, _) = send(
        app(&h),
        "PUT",
        "/profiles/u9",
        Some(json!({ "email": "not-an-address" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_push_send_reaches_every_device_and_drops_gone_ones() {
    let h = harness().await;
    h.seed_subscription(&subscription("s1", "u1", "https://push.example.com/phone"))
        .await;
    h.seed_subscription(&subscription("s2", "u1", "https://push.example.com/laptop"))
        .await;
    h.push.mark_gone("https://push.example.com/laptop");

    let (status, body) = send(
        app(&h),
        "POST",
        "/push/send",
        Some(json!({
            "userId": "u1",
            "title": "Refill due",
            "body": "Your Lisinopril refill is ready",
            "url": "/medications"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["sent"], 1);
    assert_eq!(body["failed"], 1);
    assert_eq!(body["subscriptions_removed"], 1);

    let pushes = h.push.sent();
    assert_eq!(pushes.len(), 1);
    assert_eq!(pushes[0].0, "https://push.example.com/phone");
    assert_eq!(pushes[0].1.title, "Refill due");
    assert_eq!(pushes[0].1.url, "/medications");

    let remaining = h.subscriptions("u1").await;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].endpoint, "https://push.example.com/phone");
    let (_, history) = send(app(&h), "GET", "/reminders/history?user_id=u1", None).await;
    assert_eq!(history, json!([]));
}

#[tokio::test]
async fn test_push_send_rejects_missing_user_and_needs_push() {
    let h = harness().await;
    let (status, _) = send(
        app(&h),
        "POST",
        "/push/send",
        Some(json!({ "userId": " ", "title": "Hi", "body": "there" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let without_push = Arc::new((*h.ctx).clone().with_push(None));
    let (status, body) = send(
        routes(without_push),
        "POST",
        "/push/send",
        Some(json!({ "userId": "u1", "title": "Hi", "body": "there" })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], 503);
}
