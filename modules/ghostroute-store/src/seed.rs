//! First-boot population of the opening narrative beats.

use serde_json::Value;
use tracing::info;

use crate::error::{Result, StoreError};
use crate::ingest::ingest_batch;
use crate::store::EventStore;

/// The opening sequence, authored with explicit orders in the chapterless
/// partition. Goes through the same ingest pipeline as any other batch.
const INITIAL_EVENTS: &str = include_str!("../seed/initial_events.json");

/// Populate the store on first boot. No-op when any events already exist.
/// Returns the number of events inserted.
pub async fn seed_if_empty(store: &EventStore) -> Result<usize> {
    if store.count_all().await? > 0 {
        info!("events table already populated, skipping seed");
        return Ok(0);
    }

    let batch: Vec<Value> = serde_json::from_str(INITIAL_EVENTS).map_err(StoreError::Malformed)?;
    let outcome = ingest_batch(store, &batch, None, false).await?;
    info!(inserted = outcome.inserted, "seeded initial narrative events");
    Ok(outcome.inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ghostroute_common::{validate_batch, Strictness};

    #[test]
    fn embedded_seed_passes_strict_validation() {
        let batch: Vec<Value> = serde_json::from_str(INITIAL_EVENTS).unwrap();
        assert_eq!(batch.len(), 24);
        let report = validate_batch(&batch, Strictness::Authored);
        assert!(report.is_ok(), "seed data invalid: {report}");
        // orders are the contiguous opening sequence
        let orders: Vec<i64> = batch
            .iter()
            .map(|e| e["event_order"].as_i64().unwrap())
            .collect();
        assert_eq!(orders, (1..=24).collect::<Vec<i64>>());
    }
}
