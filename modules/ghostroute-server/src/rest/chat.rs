//! Analyst chat relay and AI provider health probes.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use ai_client::stub_reply;

use crate::AppState;

/// System primer prepended to every analyst query.
const PEARL_PRIMER: &str = "You are PEARL, an investigative relay. Be concise, \
analytical, and evidence-focused. Offer next actionable steps.";

#[derive(Deserialize)]
pub struct PearlRequest {
    prompt: String,
}

pub async fn api_pearl(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PearlRequest>,
) -> Response {
    if body.prompt.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"kind": "validation", "error": "prompt required"})),
        )
            .into_response();
    }

    let Some(generator) = &state.generator else {
        return Json(json!({
            "ok": true,
            "model": "stub",
            "response": stub_reply(&body.prompt),
        }))
        .into_response();
    };

    match generator
        .generate(&format!("{PEARL_PRIMER}\nUser Query: {}", body.prompt))
        .await
    {
        Ok(text) => Json(json!({
            "ok": true,
            "model": state.config.gemini_model,
            "response": text,
        }))
        .into_response(),
        // A flaky provider must not stall the story: label and move on.
        Err(e) => {
            warn!(error = %e, "generation failed, substituting stub");
            Json(json!({
                "ok": true,
                "model": "stub",
                "response": stub_reply(&body.prompt),
            }))
            .into_response()
        }
    }
}

pub async fn api_ai_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let gemini = match &state.generator {
        None => json!({"ok": false, "detail": "missing_key"}),
        Some(generator) => {
            let start = Instant::now();
            match generator.generate("ONE-WORD: OK").await {
                Ok(_) => json!({"ok": true, "ms": start.elapsed().as_millis() as u64}),
                Err(e) => json!({
                    "ok": false,
                    "ms": start.elapsed().as_millis() as u64,
                    "detail": e.to_string(),
                }),
            }
        }
    };

    let tts = match &state.synthesizer {
        None => json!({"ok": false, "detail": "missing_key"}),
        Some(synth) => {
            let start = Instant::now();
            match synth.synthesize("OK", "Charon").await {
                Ok(bytes) if !bytes.is_empty() => {
                    json!({"ok": true, "ms": start.elapsed().as_millis() as u64})
                }
                Ok(_) => json!({
                    "ok": false,
                    "ms": start.elapsed().as_millis() as u64,
                    "detail": "empty audio payload",
                }),
                Err(e) => json!({
                    "ok": false,
                    "ms": start.elapsed().as_millis() as u64,
                    "detail": e.to_string(),
                }),
            }
        }
    };

    Json(json!({"gemini": gemini, "tts": tts}))
}
