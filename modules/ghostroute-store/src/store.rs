//! Postgres persistence for narrative events.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::{PgExecutor, PgPool};
use tracing::info;

use ghostroute_common::EventDraft;

use crate::error::{Result, StoreError};

/// A committed row from the `events` table.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub chapter: Option<i32>,
    pub event_order: i32,
    pub delay: i32,
    pub action: String,
    pub actor: Option<String>,
    pub static_text: Option<String>,
    pub voice: Option<String>,
    pub api_prompt: Option<String>,
    pub is_generated: bool,
    pub generated_content: Option<String>,
    pub misc_data: Option<serde_json::Value>,
}

/// Handle on the events table. Cheap to clone; owns a bounded pool created
/// once at startup and injected into whatever needs it.
#[derive(Clone)]
pub struct EventStore {
    pool: PgPool,
}

impl EventStore {
    /// Connect with a bounded pool. Both the connect and every later
    /// acquire are capped so a dead database surfaces as
    /// `StoreError::Unavailable` instead of a hang.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Lazy variant for the long-running server: the pool is created up
    /// front but connections are only established on first use, so a
    /// database that is down at boot degrades per-request instead of
    /// preventing startup.
    pub fn connect_lazy(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .connect_lazy(database_url)?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Close the pool. Called once at shutdown.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Idempotent DDL, safe to run every startup. The unique index wraps
    /// `chapter` in COALESCE because Postgres treats NULLs as distinct in
    /// plain unique constraints and the chapterless partition needs the
    /// same protection. Authored chapters are 1-based, so 0 is free to
    /// stand in for NULL.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS events (
                id            BIGSERIAL PRIMARY KEY,
                chapter       INT,
                event_order   INT NOT NULL,
                delay         INT NOT NULL,
                action        VARCHAR(50) NOT NULL,
                actor         VARCHAR(50),
                static_text   TEXT,
                voice         VARCHAR(50),
                api_prompt    TEXT,
                is_generated  BOOLEAN NOT NULL DEFAULT FALSE,
                generated_content TEXT,
                misc_data     JSONB
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE UNIQUE INDEX IF NOT EXISTS uq_events_partition_order
                ON events (COALESCE(chapter, 0), event_order)
            "#,
        )
        .execute(&self.pool)
        .await?;

        // `user` is reserved in Postgres, hence user_name.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS redactions (
                id             BIGSERIAL PRIMARY KEY,
                created_at     TIMESTAMPTZ NOT NULL DEFAULT now(),
                user_name      VARCHAR(100) NOT NULL DEFAULT 'anonymous',
                doc_text       TEXT NOT NULL,
                redacted_terms JSONB NOT NULL DEFAULT '[]'::jsonb,
                source_event   INT,
                notes          TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        info!("events schema ensured");
        Ok(())
    }

    /// Current maximum `event_order` in a partition, 0 when empty.
    /// The allocator seeds from this.
    pub async fn next_order_seed(&self, chapter: Option<i32>) -> Result<i32> {
        next_order_seed_on(&self.pool, chapter).await
    }

    /// Insert one event with an explicit order. A collision inside the
    /// partition maps to `DuplicateOrder` and leaves the store unchanged.
    pub async fn insert(
        &self,
        draft: &EventDraft,
        chapter: Option<i32>,
        order: i32,
    ) -> Result<i64> {
        insert_on(&self.pool, draft, chapter, order).await
    }

    /// Remove every event of a partition. 0 when the partition is absent.
    pub async fn delete_chapter(&self, chapter: Option<i32>) -> Result<u64> {
        delete_chapter_on(&self.pool, chapter).await
    }

    /// Events sorted ascending by `event_order`, tiebroken on `id` so the
    /// order is deterministic no matter what. `None` lists the whole store.
    pub async fn list_ordered(&self, chapter: Option<i32>) -> Result<Vec<EventRecord>> {
        let rows = match chapter {
            Some(c) => {
                sqlx::query_as::<_, EventRecord>(
                    r#"
                    SELECT * FROM events
                    WHERE chapter = $1
                    ORDER BY event_order ASC, id ASC
                    "#,
                )
                .bind(c)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, EventRecord>(
                    "SELECT * FROM events ORDER BY event_order ASC, id ASC",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows)
    }

    pub async fn count_all(&self) -> Result<i64> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }
}

// Executor-generic variants so the ingest pipeline can run the same
// statements inside its transaction.

pub(crate) async fn next_order_seed_on<'e, E: PgExecutor<'e>>(
    ex: E,
    chapter: Option<i32>,
) -> Result<i32> {
    let max: i32 = sqlx::query_scalar(
        r#"
        SELECT COALESCE(MAX(event_order), 0) FROM events
        WHERE COALESCE(chapter, 0) = COALESCE($1, 0)
        "#,
    )
    .bind(chapter)
    .fetch_one(ex)
    .await?;
    Ok(max)
}

pub(crate) async fn insert_on<'e, E: PgExecutor<'e>>(
    ex: E,
    draft: &EventDraft,
    chapter: Option<i32>,
    order: i32,
) -> Result<i64> {
    let result = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO events
            (chapter, event_order, delay, action, actor, static_text,
             voice, api_prompt, is_generated, generated_content, misc_data)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING id
        "#,
    )
    .bind(chapter)
    .bind(order)
    .bind(draft.delay)
    .bind(&draft.action)
    .bind(&draft.actor)
    .bind(&draft.static_text)
    .bind(&draft.voice)
    .bind(&draft.api_prompt)
    .bind(draft.is_generated)
    .bind(&draft.generated_content)
    .bind(&draft.misc_data)
    .fetch_one(ex)
    .await;

    match result {
        Ok(id) => Ok(id),
        Err(sqlx::Error::Database(db))
            if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation) =>
        {
            Err(StoreError::DuplicateOrder { chapter, order })
        }
        Err(e) => Err(e.into()),
    }
}

pub(crate) async fn delete_chapter_on<'e, E: PgExecutor<'e>>(
    ex: E,
    chapter: Option<i32>,
) -> Result<u64> {
    let result = sqlx::query(
        "DELETE FROM events WHERE COALESCE(chapter, 0) = COALESCE($1, 0)",
    )
    .bind(chapter)
    .execute(ex)
    .await?;
    Ok(result.rows_affected())
}
