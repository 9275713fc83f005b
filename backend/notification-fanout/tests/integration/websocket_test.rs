use notification_fanout::{Notification, UserId};
use serde_json::json;

use super::support::{
    authenticate, connect, next_text, send_text, start_server, stays_silent, sync, test_state,
    wait_for_user, wait_until,
};

fn follow_from_alice() -> Notification {
    Notification::follow("Alice", UserId::new(7))
}

const EXPECTED_FOLLOW_FRAME: &str = r#"{"type":"NOTIFICATION","payload":{"type":"follow","content":"Alice started following you","sourceUserId":7}}"#;

#[actix_rt::test]
async fn authenticated_connection_receives_notification() {
    let state = test_state();
    let (addr, handle) = start_server(state.clone()).await.expect("start server");
    let mut c1 = connect(addr).await;

    authenticate(&mut c1, "42").await;
    wait_for_user(&state, UserId::new(42), 1).await;

    state
        .publisher
        .publish(UserId::new(42), &follow_from_alice())
        .expect("publish");

    assert_eq!(next_text(&mut c1).await, EXPECTED_FOLLOW_FRAME);
    assert!(stays_silent(&mut c1).await);

    handle.stop(true).await;
}

#[actix_rt::test]
async fn every_connection_of_user_receives_notification() {
    let state = test_state();
    let (addr, handle) = start_server(state.clone()).await.expect("start server");
    let mut c1 = connect(addr).await;
    let mut c2 = connect(addr).await;

    authenticate(&mut c1, "42").await;
    authenticate(&mut c2, "42").await;
    wait_for_user(&state, UserId::new(42), 2).await;

    state
        .publisher
        .publish(UserId::new(42), &follow_from_alice())
        .expect("publish");

    let first = next_text(&mut c1).await;
    let second = next_text(&mut c2).await;
    assert_eq!(first, EXPECTED_FOLLOW_FRAME);
    assert_eq!(first, second);

    handle.stop(true).await;
}

#[actix_rt::test]
async fn unauthenticated_connection_receives_nothing() {
    let state = test_state();
    let (addr, handle) = start_server(state.clone()).await.expect("start server");
    let mut c1 = connect(addr).await;

    let registry = state.registry.clone();
    wait_until(move || registry.total_connections() == 1).await;

    state
        .publisher
        .publish(UserId::new(42), &follow_from_alice())
        .expect("publish");
    state
        .publisher
        .broadcast(&follow_from_alice())
        .expect("broadcast");

    assert!(stays_silent(&mut c1).await);
    assert_eq!(state.registry.authenticated_connections(), 0);

    handle.stop(true).await;
}

#[actix_rt::test]
async fn closed_connection_is_unregistered_and_publish_is_silent() {
    let state = test_state();
    let (addr, handle) = start_server(state.clone()).await.expect("start server");
    let mut c1 = connect(addr).await;

    authenticate(&mut c1, "42").await;
    wait_for_user(&state, UserId::new(42), 1).await;

    drop(c1);
    let registry = state.registry.clone();
    wait_until(move || registry.total_connections() == 0).await;

    assert!(state
        .publisher
        .publish(UserId::new(42), &follow_from_alice())
        .is_ok());

    handle.stop(true).await;
}

#[actix_rt::test]
async fn malformed_handshake_leaves_connection_unidentified() {
    let state = test_state();
    let (addr, handle) = start_server(state.clone()).await.expect("start server");
    let mut c1 = connect(addr).await;

    send_text(&mut c1, "not json").await;
    send_text(&mut c1, r#"{"type":"AUTH"}"#).await;
    send_text(&mut c1, r#"{"type":"AUTH","userId":"forty-two"}"#).await;
    send_text(&mut c1, r#"{"type":"SUBSCRIBE","userId":"42"}"#).await;
    sync(&mut c1).await;

    assert_eq!(state.registry.total_connections(), 1);
    assert_eq!(state.registry.authenticated_connections(), 0);

    // A valid handshake after rejected frames still binds
    authenticate(&mut c1, "42").await;
    wait_for_user(&state, UserId::new(42), 1).await;

    state
        .publisher
        .publish(UserId::new(42), &follow_from_alice())
        .expect("publish");
    assert_eq!(next_text(&mut c1).await, EXPECTED_FOLLOW_FRAME);

    handle.stop(true).await;
}

#[actix_rt::test]
async fn users_only_receive_their_own_notifications() {
    let state = test_state();
    let (addr, handle) = start_server(state.clone()).await.expect("start server");
    let mut alice = connect(addr).await;
    let mut bob = connect(addr).await;

    authenticate(&mut alice, "1").await;
    authenticate(&mut bob, "2").await;
    wait_for_user(&state, UserId::new(1), 1).await;
    wait_for_user(&state, UserId::new(2), 1).await;

    let like = Notification::like("Bob", 10, UserId::new(2));
    state
        .publisher
        .publish(UserId::new(1), &like)
        .expect("publish");

    let frame: serde_json::Value =
        serde_json::from_str(&next_text(&mut alice).await).expect("json frame");
    assert_eq!(
        frame,
        json!({
            "type": "NOTIFICATION",
            "payload": {
                "type": "like",
                "content": "Bob liked your music share",
                "sourceId": 10,
                "sourceUserId": 2
            }
        })
    );
    assert!(stays_silent(&mut bob).await);

    handle.stop(true).await;
}

#[actix_rt::test]
async fn notify_endpoint_delivers_to_connected_user() {
    let state = test_state();
    let (addr, handle) = start_server(state.clone()).await.expect("start server");
    let mut c1 = connect(addr).await;

    authenticate(&mut c1, "42").await;
    wait_for_user(&state, UserId::new(42), 1).await;

    let mut response = awc::Client::new()
        .post(format!("http://{addr}/api/v1/notifications/42"))
        .send_json(&json!({
            "type": "follow",
            "content": "Alice started following you",
            "sourceUserId": 7
        }))
        .await
        .expect("post notification");

    assert_eq!(response.status().as_u16(), 202);
    let body: serde_json::Value = response.json().await.expect("json body");
    assert_eq!(body["active_connections"], json!(1));
    assert_eq!(next_text(&mut c1).await, EXPECTED_FOLLOW_FRAME);

    handle.stop(true).await;
}
