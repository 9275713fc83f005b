/// HTTP and WebSocket handlers for the notification fan-out service
pub mod notifications;
pub mod websocket;

use actix_web::web;

use crate::state::AppState;

pub use notifications::register_routes as register_notifications;
pub use websocket::register_routes as register_websocket;

/// Attach shared state and every route of the service
pub fn configure(state: AppState) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        let ws_path = state.websocket.path.clone();
        cfg.app_data(web::Data::new(state.registry.clone()))
            .app_data(web::Data::new(state.publisher.clone()))
            .app_data(web::Data::new(state.websocket.clone()))
            .app_data(notifications::json_config());
        register_notifications(cfg);
        register_websocket(cfg, &ws_path);
    }
}
