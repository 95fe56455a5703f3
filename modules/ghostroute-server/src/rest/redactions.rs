//! Redacted-document submission and review listing.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use tracing::error;

use ghostroute_store::RedactionDraft;

use crate::rest::store_error_response;
use crate::AppState;

fn store_unconfigured() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({"kind": "store_unavailable", "error": "no store configured"})),
    )
        .into_response()
}

/// Store a document a player redacted. Unlike event insertion there is no
/// offline fallback: a submission is a user artifact, not narrative
/// content, so an unreachable store is reported rather than queued.
pub async fn api_redactions_insert(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<RedactionDraft>,
) -> Response {
    if draft.doc_text.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"kind": "validation", "error": "doc_text required"})),
        )
            .into_response();
    }
    let Some(store) = &state.store else {
        return store_unconfigured();
    };
    match store.insert_redaction(&draft).await {
        Ok(id) => Json(json!({"ok": true, "id": id})).into_response(),
        Err(e) => {
            error!(error = %e, "redaction insert failed");
            store_error_response(StatusCode::INTERNAL_SERVER_ERROR, &e)
        }
    }
}

/// The 50 most recent submissions, newest first, without document bodies.
pub async fn api_redactions_list(State(state): State<Arc<AppState>>) -> Response {
    let Some(store) = &state.store else {
        return store_unconfigured();
    };
    match store.list_recent_redactions().await {
        Ok(rows) => Json(rows).into_response(),
        Err(e) => {
            error!(error = %e, "redaction listing failed");
            store_error_response(StatusCode::INTERNAL_SERVER_ERROR, &e)
        }
    }
}
