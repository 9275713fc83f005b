use actix_web::{http::StatusCode, test, App};
use notification_fanout::handlers;
use serde_json::{json, Value};

use super::support::test_state;

#[actix_rt::test]
async fn notify_offline_user_is_accepted() {
    let app = test::init_service(App::new().configure(handlers::configure(test_state()))).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/notifications/42")
        .set_json(json!({
            "type": "comment",
            "content": "Alice commented on your music share",
            "sourceId": 3,
            "sourceUserId": 7
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "recipient_id": 42, "active_connections": 0 }));
}

#[actix_rt::test]
async fn notify_with_unknown_kind_is_rejected() {
    let app = test::init_service(App::new().configure(handlers::configure(test_state()))).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/notifications/42")
        .set_json(json!({ "type": "poke", "content": "hey" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].as_str().unwrap().starts_with("bad request"));
}

#[actix_rt::test]
async fn fanout_requires_recipients() {
    let app = test::init_service(App::new().configure(handlers::configure(test_state()))).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/notifications/fanout")
        .set_json(json!({
            "recipients": [],
            "notification": { "type": "music_share", "content": "Alice shared a new track" }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn fanout_accepts_string_and_numeric_recipients() {
    let app = test::init_service(App::new().configure(handlers::configure(test_state()))).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/notifications/fanout")
        .set_json(json!({
            "recipients": [2, "3"],
            "notification": {
                "type": "music_share",
                "content": "Alice shared a new track",
                "sourceId": 77,
                "sourceUserId": 1
            }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "recipients": 2, "kind": "music_share" }));
}

#[actix_rt::test]
async fn status_reports_disconnected_user() {
    let app = test::init_service(App::new().configure(handlers::configure(test_state()))).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/ws/status/42")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(
        body,
        json!({ "user_id": 42, "connected": false, "connection_count": 0 })
    );
}

#[actix_rt::test]
async fn ws_metrics_start_empty() {
    let app = test::init_service(App::new().configure(handlers::configure(test_state()))).await;

    let req = test::TestRequest::get().uri("/api/v1/ws/metrics").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["total_connections"], json!(0));
    assert_eq!(body["authenticated_connections"], json!(0));
    assert_eq!(body["connected_users"], json!(0));
}

#[actix_rt::test]
async fn broadcast_is_accepted_without_connections() {
    let app = test::init_service(App::new().configure(handlers::configure(test_state()))).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/ws/broadcast")
        .set_json(json!({
            "type": "listening_party",
            "content": "Friday night listening party starts now"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
}
