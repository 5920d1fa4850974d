mod dto;
mod error;
mod handlers;
mod services;
mod state;

#[cfg(test)]
mod tests;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use atas_config::Settings;
use atas_llm::{ChatModel, LlmClient};
use axum::body::Body;
use axum::http::{Request, Response};
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub use state::ServerState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .compact()
        .init();

    let settings = Settings::from_env()?;

    let model: Option<Arc<dyn ChatModel>> = match LlmClient::new(&settings.llm) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            warn!("LLM client unavailable: {}", e);
            None
        }
    };

    let state = Arc::new(ServerState::new(&settings, model));
    let app = app(state);

    let addr = settings.server.addr();
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the router with logging and CORS layers.
pub fn app(state: Arc<ServerState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %req.method(),
                uri = %req.uri(),
                version = ?req.version(),
            )
        })
        .on_response(|res: &Response<Body>, latency: Duration, _span: &tracing::Span| {
            info!(
                latency = %format!("{} ms", latency.as_millis()),
                status = %res.status().as_u16(),
                "finished processing request"
            );
        });

    let logged_routes = Router::new()
        // Minutes generation
        .route("/gerar_ata", post(handlers::ata::generate))
        .route("/api/atas/gerar", post(handlers::ata::generate))
        // Task-list file and pipeline
        .route("/get_pipeline_file", get(handlers::pipeline::get_file))
        .route("/save_pipeline_file", post(handlers::pipeline::save_file))
        .route("/run_pipeline", post(handlers::pipeline::run))
        .route("/pipeline_status/{build_id}", get(handlers::pipeline::status))
        // Boards
        .route("/api/companies", get(handlers::boards::companies))
        .route("/api/my-cards", get(handlers::boards::my_cards))
        .route("/api/boards/sprints", get(handlers::boards::sprints))
        .route("/api/boards/my-work-items", get(handlers::boards::my_work_items))
        .route("/api/sprint-info", get(handlers::boards::sprint_info))
        // Minutes work items
        .route("/api/ata/{id}/details", get(handlers::ata::details))
        .route("/api/ata/{id}/status", put(handlers::ata::update_status))
        .route("/api/ata/{id}/save", post(handlers::ata::save))
        .layer(trace_layer);

    Router::new()
        .merge(logged_routes)
        .route("/health", get(handlers::health))
        .layer(cors)
        .with_state(state)
}
