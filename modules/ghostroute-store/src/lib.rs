pub mod alloc;
pub mod error;
pub mod fallback;
pub mod ingest;
pub mod migrate;
pub mod redactions;
pub mod seed;
mod store;

pub use alloc::OrderAllocator;
pub use error::{Result, StoreError};
pub use fallback::write_insert_script;
pub use ingest::{ingest_batch, ingest_runtime, IngestOutcome};
pub use migrate::{MigrationRunner, MigrationSummary};
pub use redactions::{RedactionDraft, RedactionRecord, RECENT_REDACTIONS_LIMIT};
pub use seed::seed_if_empty;
pub use store::{EventRecord, EventStore};
