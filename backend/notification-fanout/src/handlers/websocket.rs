/// WebSocket endpoints
///
/// The upgrade route accepts browser connections; the `/api/v1/ws` scope
/// exposes connection status and broadcast for other services.
use actix_web::{web, HttpRequest, HttpResponse, Result as ActixResult};
use actix_web_actors::ws;
use serde_json::json;
use std::sync::Arc;

use crate::config::WebSocketConfig;
use crate::error::AppError;
use crate::models::{Notification, UserId};
use crate::websocket::{NotificationSession, SessionPublisher, SessionRegistry};

/// Upgrade to a WebSocket and start a session.
///
/// Endpoint: GET {WS_PATH} (default /ws)
pub async fn ws_upgrade(
    req: HttpRequest,
    stream: web::Payload,
    registry: web::Data<Arc<SessionRegistry>>,
    settings: web::Data<WebSocketConfig>,
) -> ActixResult<HttpResponse> {
    let session = NotificationSession::new(
        registry.get_ref().clone(),
        settings.keepalive_interval(),
    );

    tracing::debug!(
        connection_id = %session.connection_id(),
        peer = ?req.peer_addr(),
        "accepting WebSocket connection"
    );

    ws::WsResponseBuilder::new(session, &req, stream)
        .frame_size(settings.max_frame_size)
        .start()
}

/// Get WebSocket connection status for a user
///
/// Endpoint: GET /api/v1/ws/status/{user_id}
pub async fn ws_status(
    path: web::Path<i64>,
    registry: web::Data<Arc<SessionRegistry>>,
) -> ActixResult<HttpResponse> {
    let user_id = UserId::new(path.into_inner());
    let connection_count = registry.connection_count(user_id);

    Ok(HttpResponse::Ok().json(json!({
        "user_id": user_id,
        "connected": connection_count > 0,
        "connection_count": connection_count
    })))
}

/// Get connection metrics
///
/// Endpoint: GET /api/v1/ws/metrics
pub async fn ws_metrics(registry: web::Data<Arc<SessionRegistry>>) -> ActixResult<HttpResponse> {
    let total_connections = registry.total_connections();
    let authenticated_connections = registry.authenticated_connections();
    let connected_users = registry.connected_user_ids().len();

    Ok(HttpResponse::Ok().json(json!({
        "total_connections": total_connections,
        "authenticated_connections": authenticated_connections,
        "connected_users": connected_users,
        "average_connections_per_user": if connected_users > 0 {
            authenticated_connections as f64 / connected_users as f64
        } else {
            0.0
        }
    })))
}

/// Broadcast a notification to every authenticated connection
///
/// Endpoint: POST /api/v1/ws/broadcast
pub async fn broadcast_message(
    publisher: web::Data<SessionPublisher>,
    body: web::Json<Notification>,
) -> Result<HttpResponse, AppError> {
    let notification = body.into_inner();
    publisher.broadcast(&notification)?;

    Ok(HttpResponse::Accepted().json(json!({
        "success": true,
        "kind": notification.kind(),
        "authenticated_connections": publisher.registry().authenticated_connections()
    })))
}

/// Register the upgrade route at `ws_path` and the `/api/v1/ws` scope
pub fn register_routes(cfg: &mut web::ServiceConfig, ws_path: &str) {
    cfg.route(ws_path, web::get().to(ws_upgrade)).service(
        web::scope("/api/v1/ws")
            .route("/status/{user_id}", web::get().to(ws_status))
            .route("/metrics", web::get().to(ws_metrics))
            .route("/broadcast", web::post().to(broadcast_message)),
    );
}
