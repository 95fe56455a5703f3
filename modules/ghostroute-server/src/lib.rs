use std::sync::Arc;

use axum::{
    http::{header, HeaderValue},
    routing::{get, post},
    Router,
};
use tower_http::set_header::SetResponseHeaderLayer;

use ai_client::{SpeechSynthesizer, TextGenerator};
use ghostroute_common::Config;
use ghostroute_store::EventStore;

pub mod rest;

pub struct AppState {
    /// Absent when no DATABASE_URL is configured: listings come back empty
    /// and runtime ingestion degrades to the fallback artifact writer.
    pub store: Option<EventStore>,
    /// Absent when no API key is configured: responses are labeled stubs.
    pub generator: Option<Arc<dyn TextGenerator>>,
    pub synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
    pub config: Config,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/api/ping", get(rest::api_ping))
        // Narrative events
        .route("/api/events", get(rest::api_events).post(rest::api_events_insert))
        // Redacted documents
        .route(
            "/api/redactions",
            get(rest::redactions::api_redactions_list).post(rest::redactions::api_redactions_insert),
        )
        // Speech + audio
        .route("/api/tts", post(rest::speech::api_tts))
        .route("/api/audio", post(rest::speech::api_audio_upload))
        .route("/api/audio-logs/batch", post(rest::speech::api_audio_logs_batch))
        // Analyst chat + provider health
        .route("/api/pearl", post(rest::chat::api_pearl))
        .route("/api/ai/health", get(rest::chat::api_ai_health))
        .with_state(state)
        // CORS
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        // Narrative state is live: never cache API responses
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        // Logging layer: method + path + status + latency only
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}
