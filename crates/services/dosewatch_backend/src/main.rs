// File: services/dosewatch_backend/src/main.rs
mod app_state;
mod service_factory;

use axum::{extract::State, routing::get, Json, Router};
use dosewatch_config::load_config;
use serde::Serialize;
use std::sync::Arc;
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};

use app_state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    database: bool,
}

#[axum::debug_handler]
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = state.db.is_healthy().await;
    Json(HealthResponse {
        status: if database { "ok" } else { "degraded" },
        database,
    })
}

/// Resolves on SIGINT, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("Cannot listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!("Cannot listen for SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received SIGINT, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Arc::new(load_config()?);
    let _logging = dosewatch_common::init_from_config(&config.logging);

    let state = AppState::new(config.clone()).await?;

    let api_router = Router::new()
        .route("/", get(|| async { "Welcome to the DoseWatch API!" }))
        .route("/health", get(health))
        .with_state(state.clone())
        .merge(dosewatch_reminders::routes(state.reminders.clone()));

    #[cfg(feature = "push")]
    let api_router = api_router.merge(dosewatch_push::routes(state.push.clone()));

    #[allow(unused_mut)] // mutated only with the openapi feature
    let mut app = Router::new().nest("/api", api_router);

    #[cfg(feature = "openapi")]
    {
        #[cfg(feature = "push")]
        use dosewatch_push::openapi::PushApiDoc;
        use dosewatch_reminders::openapi::ReminderApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "DoseWatch API",
                version = "0.1.0",
                description = "Medication reminders over push, email and SMS",
                license(name = "MIT", url = "https://opensource.org/licenses/MIT")
            ),
            servers((url = "/api", description = "Main API Prefix")),
        )]
        struct ApiDoc;

        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(ReminderApiDoc::openapi());
        #[cfg(feature = "push")]
        openapi_doc.merge(PushApiDoc::openapi());
        info!("Swagger UI at /api/docs");

        app = app.merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc));
    }

    let app = app.layer(TraceLayer::new_for_http()).layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    );

    let scheduler = dosewatch_reminders::spawn_scheduler(state.reminders.clone(), &config.scheduler);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("DoseWatch listening on http://{}/api", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = scheduler {
        handle.abort();
    }
    info!("Server shutdown complete");
    Ok(())
}
