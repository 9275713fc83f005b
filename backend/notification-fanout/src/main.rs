use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use notification_fanout::{handlers, logging, metrics, AppState, Config};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init_tracing();

    let config = Config::from_env().context("failed to load configuration")?;
    tracing::info!(env = %config.app.env, "Starting notification fan-out service");

    let state = AppState::new(config.websocket.clone());
    tracing::info!(
        ws_path = %config.websocket.path,
        keepalive_secs = config.websocket.keepalive_interval_secs,
        "WebSocket connection registry initialized"
    );

    let addr = config.bind_addr();
    tracing::info!("Starting HTTP server on {}", addr);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .wrap(metrics::MetricsMiddleware)
            .route("/health", web::get().to(|| async { "OK" }))
            .route("/metrics", web::get().to(metrics::serve_metrics))
            .route("/", web::get().to(|| async { "Notification Fan-out v1.0" }))
            .configure(handlers::configure(state.clone()))
    })
    .bind(&addr)
    .with_context(|| format!("failed to bind {addr}"))?
    .run()
    .await
    .context("HTTP server error")?;

    tracing::info!("Notification fan-out service stopped");
    Ok(())
}
