/// HTTP entry points for write-path services
///
/// Called after the notification record is persisted. Delivery is
/// best-effort, so these respond 202 whether or not the user is online.
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::error::AppError;
use crate::models::{Notification, UserId};
use crate::websocket::SessionPublisher;

#[derive(Debug, Deserialize)]
pub struct FanoutRequest {
    pub recipients: Vec<UserId>,
    pub notification: Notification,
}

/// Push a notification to one user
///
/// Endpoint: POST /api/v1/notifications/{user_id}
pub async fn notify_user(
    path: web::Path<i64>,
    publisher: web::Data<SessionPublisher>,
    body: web::Json<Notification>,
) -> Result<HttpResponse, AppError> {
    let recipient_id = UserId::new(path.into_inner());
    publisher.publish(recipient_id, &body)?;

    Ok(HttpResponse::Accepted().json(json!({
        "recipient_id": recipient_id,
        "active_connections": publisher.registry().connection_count(recipient_id)
    })))
}

/// Push the same notification to several users, e.g. every follower of a sharer
///
/// Endpoint: POST /api/v1/notifications/fanout
pub async fn fanout(
    publisher: web::Data<SessionPublisher>,
    body: web::Json<FanoutRequest>,
) -> Result<HttpResponse, AppError> {
    let FanoutRequest {
        recipients,
        notification,
    } = body.into_inner();

    if recipients.is_empty() {
        return Err(AppError::BadRequest("recipients must not be empty".to_string()));
    }

    publisher.publish_many(recipients.iter().copied(), &notification)?;

    Ok(HttpResponse::Accepted().json(json!({
        "recipients": recipients.len(),
        "kind": notification.kind()
    })))
}

/// Register notification routes
pub fn register_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/notifications")
            .route("/fanout", web::post().to(fanout))
            .route("/{user_id}", web::post().to(notify_user)),
    );
}

/// JSON extractor config answering malformed bodies with a JSON 400
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}
