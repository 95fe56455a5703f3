//! Player-submitted redacted documents.
//!
//! The redaction minigame posts the document a player censored; analysts
//! later review the most recent submissions. Stored separately from events
//! because redactions are user artifacts, not narrative beats.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::Result;
use crate::store::EventStore;

/// How many submissions the review listing returns.
pub const RECENT_REDACTIONS_LIMIT: i64 = 50;

/// A submission as received from the client. `doc_text` is the only
/// required field; everything else has a sensible absent form.
#[derive(Debug, Clone, Deserialize)]
pub struct RedactionDraft {
    #[serde(default = "default_user")]
    pub user: String,
    pub doc_text: String,
    #[serde(default)]
    pub redacted_terms: Vec<String>,
    #[serde(default)]
    pub source_event: Option<i32>,
    #[serde(default)]
    pub notes: Option<String>,
}

fn default_user() -> String {
    "anonymous".to_string()
}

/// A listed submission. `doc_text` is deliberately absent: the review
/// listing shows who redacted what terms, not the full document.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct RedactionRecord {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub user_name: String,
    pub redacted_terms: serde_json::Value,
    pub source_event: Option<i32>,
    pub notes: Option<String>,
}

impl EventStore {
    /// Store one redacted document, returning its id.
    pub async fn insert_redaction(&self, draft: &RedactionDraft) -> Result<i64> {
        let terms = serde_json::to_value(&draft.redacted_terms)?;
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO redactions (user_name, doc_text, redacted_terms, source_event, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&draft.user)
        .bind(&draft.doc_text)
        .bind(&terms)
        .bind(draft.source_event)
        .bind(&draft.notes)
        .fetch_one(self.pool())
        .await?;
        Ok(id)
    }

    /// The most recent submissions, newest first, capped at
    /// `RECENT_REDACTIONS_LIMIT`.
    pub async fn list_recent_redactions(&self) -> Result<Vec<RedactionRecord>> {
        let rows = sqlx::query_as::<_, RedactionRecord>(
            r#"
            SELECT id, created_at, user_name, redacted_terms, source_event, notes
            FROM redactions
            ORDER BY created_at DESC, id DESC
            LIMIT $1
            "#,
        )
        .bind(RECENT_REDACTIONS_LIMIT)
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }
}
