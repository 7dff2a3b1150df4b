use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

static GENERATION_RUNS: AtomicU64 = AtomicU64::new(0);
static INSTANCES_INSERTED: AtomicU64 = AtomicU64::new(0);
static INSTANCES_SKIPPED: AtomicU64 = AtomicU64::new(0);
static INSERT_CONFLICTS: AtomicU64 = AtomicU64::new(0);
static STATUS_PREVIEWS: AtomicU64 = AtomicU64::new(0);

fn saturating_add(counter: &AtomicU64, amount: u64) {
    let _ = counter.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
        Some(current.saturating_add(amount))
    });
}

/// Record one completed generate request.
///
/// `skipped` covers every matching date that was not written, whether it was
/// known before generation or lost an insert race. `conflicts` is the subset
/// only detected at insert time.
pub fn instances_generated(inserted: u64, skipped: u64, conflicts: u64) {
    GENERATION_RUNS.fetch_add(1, Ordering::Relaxed);
    saturating_add(&INSTANCES_INSERTED, inserted);
    saturating_add(&INSTANCES_SKIPPED, skipped);
    saturating_add(&INSERT_CONFLICTS, conflicts);
}

pub fn status_previewed() {
    STATUS_PREVIEWS.fetch_add(1, Ordering::Relaxed);
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct MetricsSnapshot {
    pub generation_runs: u64,
    pub instances_inserted: u64,
    pub instances_skipped: u64,
    pub insert_conflicts: u64,
    pub status_previews: u64,
}

pub fn metrics_snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        generation_runs: GENERATION_RUNS.load(Ordering::Relaxed),
        instances_inserted: INSTANCES_INSERTED.load(Ordering::Relaxed),
        instances_skipped: INSTANCES_SKIPPED.load(Ordering::Relaxed),
        insert_conflicts: INSERT_CONFLICTS.load(Ordering::Relaxed),
        status_previews: STATUS_PREVIEWS.load(Ordering::Relaxed),
    }
}
