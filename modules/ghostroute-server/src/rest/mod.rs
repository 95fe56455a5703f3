pub mod chat;
pub mod redactions;
pub mod speech;

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, warn};

use ghostroute_common::{validate_batch, EventDraft, Strictness};
use ghostroute_store::{ingest_runtime, write_insert_script, StoreError};

use crate::AppState;

// --- Query structs ---

#[derive(Deserialize)]
pub struct EventsQuery {
    chapter: Option<i32>,
}

#[derive(Deserialize)]
pub struct InsertRequest {
    events: Vec<Value>,
    #[serde(default)]
    chapter: Option<i32>,
}

// --- Helpers ---

pub(crate) fn store_error_response(status: StatusCode, err: &StoreError) -> Response {
    (
        status,
        Json(json!({"kind": err.kind(), "error": err.to_string()})),
    )
        .into_response()
}

fn validation_response(report: &ghostroute_common::ValidationReport) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "kind": "validation",
            "violations": report.violations,
            "action_counts": report.action_counts,
        })),
    )
        .into_response()
}

// --- Handlers ---

pub async fn api_ping() -> impl IntoResponse {
    Json(json!({"ok": true, "ts": chrono::Utc::now().timestamp_millis()}))
}

/// Ordered listing for one partition or the whole store. An empty or
/// unconfigured store yields an empty array, never an error.
pub async fn api_events(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EventsQuery>,
) -> Response {
    let Some(store) = &state.store else {
        return Json(Value::Array(Vec::new())).into_response();
    };
    match store.list_ordered(query.chapter).await {
        Ok(rows) => Json(rows).into_response(),
        Err(e) => {
            error!(error = %e, "event listing failed");
            store_error_response(StatusCode::INTERNAL_SERVER_ERROR, &e)
        }
    }
}

/// Runtime insertion: orders are always allocator-assigned and the
/// partition is never replaced. When the store is unreachable the batch is
/// preserved as a replayable insert script and the call reports `ok:false`
/// with a per-item outcome list — narrative content must never be lost to a
/// transient outage.
pub async fn api_events_insert(
    State(state): State<Arc<AppState>>,
    Json(body): Json<InsertRequest>,
) -> Response {
    if body.events.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"kind": "validation", "error": "events array required"})),
        )
            .into_response();
    }

    // Validate up front so garbage never reaches the store or the artifact.
    let report = validate_batch(&body.events, Strictness::Runtime);
    if !report.is_ok() {
        return validation_response(&report);
    }

    match &state.store {
        Some(store) => match ingest_runtime(store, &body.events, body.chapter).await {
            Ok(outcome) => {
                let items: Vec<Value> = outcome
                    .orders
                    .iter()
                    .map(|order| json!({"ok": true, "event_order": order}))
                    .collect();
                (
                    StatusCode::CREATED,
                    Json(json!({"ok": true, "inserted": outcome.inserted, "items": items})),
                )
                    .into_response()
            }
            Err(e @ StoreError::Unavailable(_)) => {
                warn!(error = %e, "store unreachable, degrading to fallback artifact");
                write_fallback(&state, &body.events, body.chapter)
            }
            Err(StoreError::Validation(report)) => validation_response(&report),
            Err(e) => {
                error!(error = %e, "runtime event insert failed");
                store_error_response(StatusCode::INTERNAL_SERVER_ERROR, &e)
            }
        },
        None => write_fallback(&state, &body.events, body.chapter),
    }
}

/// Degraded path: render the batch as literal, quote-escaped insert
/// statements to a local artifact for later manual replay.
fn write_fallback(state: &AppState, events: &[Value], chapter: Option<i32>) -> Response {
    let drafts: Vec<EventDraft> = match events
        .iter()
        .map(|v| serde_json::from_value(v.clone()))
        .collect::<Result<_, _>>()
    {
        Ok(drafts) => drafts,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"kind": "validation", "error": e.to_string()})),
            )
                .into_response();
        }
    };

    match write_insert_script(&state.config.fallback_dir, &drafts, chapter) {
        Ok(path) => {
            let items: Vec<Value> = drafts
                .iter()
                .map(|_| json!({"ok": false, "queued": true}))
                .collect();
            (
                StatusCode::ACCEPTED,
                Json(json!({
                    "ok": false,
                    "kind": "store_unavailable",
                    "artifact": path.display().to_string(),
                    "items": items,
                })),
            )
                .into_response()
        }
        // Both the store and the local disk failed: nothing preserved,
        // so say so loudly.
        Err(e) => {
            error!(error = %e, "fallback artifact write failed, batch lost");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"kind": "fallback_failed", "error": e.to_string()})),
            )
                .into_response()
        }
    }
}
