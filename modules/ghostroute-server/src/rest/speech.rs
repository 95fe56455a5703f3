//! Text-to-speech and audio clip endpoints.

use std::fs;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;
use uuid::Uuid;

use ai_client::{silent_wav, SILENT_WAV_MS};
use ghostroute_common::EventDraft;
use ghostroute_store::OrderAllocator;

use crate::AppState;

#[derive(Deserialize)]
pub struct TtsRequest {
    text: String,
    #[serde(default)]
    voice: Option<String>,
    #[serde(default)]
    file_name: Option<String>,
}

#[derive(Deserialize)]
pub struct AudioUploadRequest {
    file_name: String,
    base64: String,
}

#[derive(Deserialize)]
pub struct AudioLogEntry {
    #[serde(default)]
    text: String,
    #[serde(default)]
    voice: Option<String>,
    #[serde(default)]
    actor: Option<String>,
    #[serde(default)]
    file_name: Option<String>,
}

#[derive(Deserialize)]
pub struct AudioLogBatchRequest {
    logs: Vec<AudioLogEntry>,
    #[serde(default)]
    include_events: bool,
}

pub const MAX_BATCH_LOGS: usize = 10;
const DEFAULT_VOICE: &str = "Charon";

/// Strip any path components and replace everything outside
/// `[A-Za-z0-9._-]` so a client-supplied name can't escape the audio dir.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    base.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn generated_name() -> String {
    format!(
        "tts_{}_{}.wav",
        Utc::now().format("%Y%m%d%H%M%S"),
        Uuid::new_v4().simple()
    )
}

/// Synthesize, or fall back to the fixed-duration silent placeholder on a
/// missing key or provider failure. The second element reports whether the
/// stub was used.
async fn synthesize_or_stub(state: &AppState, text: &str, voice: &str) -> (Vec<u8>, bool) {
    match &state.synthesizer {
        Some(synth) => match synth.synthesize(text, voice).await {
            Ok(bytes) => (bytes, false),
            Err(e) => {
                warn!(error = %e, voice, "synthesis failed, substituting silent clip");
                (silent_wav(SILENT_WAV_MS), true)
            }
        },
        None => (silent_wav(SILENT_WAV_MS), true),
    }
}

/// Write a clip under the audio dir and return its public URL.
fn store_clip(state: &AppState, name: &str, bytes: &[u8]) -> std::io::Result<String> {
    fs::create_dir_all(&state.config.audio_dir)?;
    fs::write(state.config.audio_dir.join(name), bytes)?;
    Ok(format!("{}/{}", state.config.audio_public_path, name))
}

pub async fn api_tts(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TtsRequest>,
) -> Response {
    if body.text.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"kind": "validation", "error": "text required"})),
        )
            .into_response();
    }

    let voice = body.voice.as_deref().unwrap_or(DEFAULT_VOICE).to_string();
    let name = match body.file_name.as_deref().map(sanitize_file_name) {
        Some(n) if !n.is_empty() => n,
        _ => generated_name(),
    };

    let (bytes, stub) = synthesize_or_stub(&state, &body.text, &voice).await;
    match store_clip(&state, &name, &bytes) {
        Ok(url) => Json(json!({"ok": true, "url": url, "voice": voice, "stub": stub})).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"kind": "io", "error": e.to_string()})),
        )
            .into_response(),
    }
}

pub async fn api_audio_upload(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AudioUploadRequest>,
) -> Response {
    let name = sanitize_file_name(&body.file_name);
    if name.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"kind": "validation", "error": "file_name required"})),
        )
            .into_response();
    }
    let bytes = match BASE64.decode(&body.base64) {
        Ok(b) => b,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"kind": "validation", "error": format!("invalid base64: {e}")})),
            )
                .into_response();
        }
    };
    match store_clip(&state, &name, &bytes) {
        Ok(url) => Json(json!({"ok": true, "url": url})).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"kind": "io", "error": e.to_string()})),
        )
            .into_response(),
    }
}

/// Best-effort batch synthesis. Every item gets a tagged outcome; with
/// `include_events` each successful clip also appends an `audioLog` event
/// seeded from the partition maximum. A failed event insert marks the item
/// but does not undo its audio.
pub async fn api_audio_logs_batch(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AudioLogBatchRequest>,
) -> Response {
    if body.logs.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"kind": "validation", "error": "logs array required"})),
        )
            .into_response();
    }
    if body.logs.len() > MAX_BATCH_LOGS {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"kind": "validation", "error": format!("max {MAX_BATCH_LOGS} logs per batch")})),
        )
            .into_response();
    }

    // Event appends are opt-in and best-effort: a dead store skips them
    // rather than failing the audio work.
    let mut alloc = None;
    if body.include_events {
        if let Some(store) = &state.store {
            match store.next_order_seed(None).await {
                Ok(seed) => alloc = Some((store, OrderAllocator::new(seed))),
                Err(e) => {
                    warn!(error = %e, "order seed fetch failed, skipping event inserts")
                }
            }
        }
    }
    let inserting = alloc.is_some();

    let mut results: Vec<Value> = Vec::with_capacity(body.logs.len());
    for entry in &body.logs {
        if entry.text.trim().is_empty() {
            results.push(json!({"ok": false, "kind": "validation", "error": "text required for each log"}));
            continue;
        }
        let voice = entry.voice.as_deref().unwrap_or(DEFAULT_VOICE).to_string();
        let name = match entry.file_name.as_deref().map(sanitize_file_name) {
            Some(n) if !n.is_empty() => n,
            _ => generated_name(),
        };

        let (bytes, stub) = synthesize_or_stub(&state, &entry.text, &voice).await;
        let url = match store_clip(&state, &name, &bytes) {
            Ok(url) => url,
            Err(e) => {
                results.push(json!({"ok": false, "kind": "io", "error": e.to_string()}));
                continue;
            }
        };

        let preview: String = entry.text.chars().take(80).collect();
        let mut item = json!({
            "ok": true,
            "url": url,
            "voice": voice,
            "stub": stub,
            "text_preview": preview,
        });

        if let Some((store, alloc)) = alloc.as_mut() {
            let mut draft = EventDraft::new("audioLog");
            draft.delay = 500;
            draft.actor = entry.actor.clone();
            draft.static_text = Some(entry.text.clone());
            draft.voice = Some(voice);
            let order = alloc.next();
            match store.insert(&draft, None, order).await {
                Ok(_) => item["inserted_event_order"] = json!(order),
                Err(e) => {
                    warn!(error = %e, order, "audio log event insert failed");
                    item["event_error"] = json!({"kind": e.kind(), "error": e.to_string()});
                }
            }
        }
        results.push(item);
    }

    Json(json!({
        "ok": true,
        "count": results.len(),
        "results": results,
        "db_inserts": inserting,
    }))
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_keeps_safe_names() {
        assert_eq!(sanitize_file_name("knox_log_01.wav"), "knox_log_01.wav");
    }

    #[test]
    fn sanitize_strips_path_traversal() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("..\\windows\\boot.ini"), "boot.ini");
    }

    #[test]
    fn sanitize_replaces_shell_noise() {
        assert_eq!(sanitize_file_name("a b$(rm).wav"), "a_b__rm_.wav");
    }

    #[test]
    fn generated_names_are_wavs() {
        let name = generated_name();
        assert!(name.starts_with("tts_"));
        assert!(name.ends_with(".wav"));
        assert_eq!(name, sanitize_file_name(&name));
    }
}
