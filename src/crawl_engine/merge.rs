//! Merge of unit checkpoints into the final artifact.
//!
//! Checkpoints are read once each, in sorted unit order, and unioned with
//! first-seen-wins; a record two units share keeps the payload of the unit
//! that sorts first. An optional seed (the accumulating artifact of an
//! interrupted single-worker run) only fills identifiers no checkpoint has.
//! The cap truncates to the first N in that order.

use anyhow::Result;
use log::{debug, info};

use crate::models::RecordSet;
use crate::store::CheckpointStore;

#[derive(Debug, Clone)]
pub struct MergeReport {
    pub records: RecordSet,
    /// Checkpoint files read, in read order
    pub units_read: Vec<String>,
    pub truncated: usize,
}

pub async fn merge_checkpoints(
    store: &CheckpointStore,
    seed: Option<RecordSet>,
    max_results: Option<usize>,
) -> Result<MergeReport> {
    let mut merged = RecordSet::new();
    let mut units_read = Vec::new();

    for entry in store.list_all().await? {
        let unit_records = store.load(&entry.path).await?;
        let found = unit_records.len();
        let added = merged.absorb(unit_records);
        debug!("Merged {}: {found} records, {added} new", entry.unit);
        units_read.push(entry.unit);
    }

    if let Some(seed) = seed {
        let added = merged.absorb(seed);
        if added > 0 {
            debug!("Merged {added} records from previous progress");
        }
    }

    let mut truncated = 0;
    if let Some(cap) = max_results
        && merged.len() > cap
    {
        truncated = merged.len() - cap;
        merged.truncate(cap);
        info!("Result cap {cap}: dropped {truncated} records");
    }

    Ok(MergeReport {
        records: merged,
        units_read,
        truncated,
    })
}
