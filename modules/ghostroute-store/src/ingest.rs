//! The only write path for event batches: validate, then mutate inside a
//! single transaction so partial insertion is never observable.

use serde_json::Value;
use tracing::info;

use ghostroute_common::{validate_batch, EventDraft, Strictness};

use crate::alloc::OrderAllocator;
use crate::error::{Result, StoreError};
use crate::store::{delete_chapter_on, insert_on, next_order_seed_on, EventStore};

/// What an ingest did, for logs and API responses.
#[derive(Debug)]
pub struct IngestOutcome {
    pub inserted: usize,
    pub deleted: u64,
    /// Final `event_order` of each inserted event, in input order.
    pub orders: Vec<i32>,
}

/// Ingest an authored batch of raw JSON events.
///
/// 1. Validate strictly; any violation aborts with the full list and no
///    store mutation.
/// 2. In one transaction: optionally empty the partition (`replace`), then
///    insert each event in input order — authored `event_order` values are
///    used verbatim, events without one get the next allocated value seeded
///    from the (possibly just-emptied) partition.
/// 3. Commit; any failure rolls the whole batch back.
pub async fn ingest_batch(
    store: &EventStore,
    raw: &[Value],
    chapter: Option<i32>,
    replace: bool,
) -> Result<IngestOutcome> {
    let report = validate_batch(raw, Strictness::Authored);
    if !report.is_ok() {
        return Err(StoreError::Validation(report));
    }
    let drafts = decode(raw)?;
    write_batch(store, &drafts, chapter, replace, false).await
}

/// Runtime insertion variant: sparse events are accepted, `event_order` is
/// always allocator-assigned, and the partition is never replaced. The
/// degraded fallback for an unreachable store lives with the caller (it
/// needs a place to write the artifact); this path just surfaces
/// `Unavailable` promptly.
pub async fn ingest_runtime(
    store: &EventStore,
    raw: &[Value],
    chapter: Option<i32>,
) -> Result<IngestOutcome> {
    let report = validate_batch(raw, Strictness::Runtime);
    if !report.is_ok() {
        return Err(StoreError::Validation(report));
    }
    let drafts = decode(raw)?;
    write_batch(store, &drafts, chapter, false, true).await
}

fn decode(raw: &[Value]) -> Result<Vec<EventDraft>> {
    raw.iter()
        .map(|v| serde_json::from_value(v.clone()).map_err(StoreError::from))
        .collect()
}

async fn write_batch(
    store: &EventStore,
    drafts: &[EventDraft],
    chapter: Option<i32>,
    replace: bool,
    force_allocate: bool,
) -> Result<IngestOutcome> {
    let mut tx = store.pool().begin().await?;

    let deleted = if replace {
        delete_chapter_on(&mut *tx, chapter).await?
    } else {
        0
    };

    let seed = next_order_seed_on(&mut *tx, chapter).await?;
    let mut alloc = OrderAllocator::new(seed);
    let mut orders = Vec::with_capacity(drafts.len());

    for draft in drafts {
        let order = match draft.event_order {
            Some(authored) if !force_allocate => authored,
            _ => alloc.next(),
        };
        insert_on(&mut *tx, draft, chapter, order).await?;
        orders.push(order);
    }

    tx.commit().await?;

    info!(
        chapter = ?chapter,
        inserted = orders.len(),
        deleted,
        "event batch committed"
    );

    Ok(IngestOutcome {
        inserted: orders.len(),
        deleted,
        orders,
    })
}
