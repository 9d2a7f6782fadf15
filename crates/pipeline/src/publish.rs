use std::collections::BTreeSet;

use logalert_core::error::{LogAlertError, Result};
use tracing::{debug, warn};

use crate::bus::{EventBusClient, PutEventsEntry};

/// Destination caps one request at this many entries.
pub const MAX_ENTRIES_PER_REQUEST: usize = 10;

/// Fixed tags carried on every published entry.
pub const SOURCE: &str = "logalert";
pub const DETAIL_TYPE: &str = "log-alert";

/// Republishes the rendered documents onto the event bus, chunk by chunk in
/// original order. The stable key of a document is its stringified index.
///
/// The loop only reaches a new chunk when the previous chunk was accepted in
/// full: any rejection anywhere raises `PublishRejected` immediately, and
/// rejected entries are never retried (callers re-invoke). Acceptance is
/// per-entry, so `succeeded` always reflects exactly the keys the
/// destination acknowledged. Returns the number of published documents.
pub async fn publish_batch<C: EventBusClient>(
    client: &C,
    documents: &[String],
    event_bus_name: &str,
) -> Result<usize> {
    let keyed: Vec<(String, &String)> = documents
        .iter()
        .enumerate()
        .map(|(i, doc)| (i.to_string(), doc))
        .collect();
    let all: BTreeSet<String> = keyed.iter().map(|(k, _)| k.clone()).collect();
    let mut succeeded: BTreeSet<String> = BTreeSet::new();

    while succeeded != all {
        let mut keys = Vec::new();
        let mut entries = Vec::new();
        for (key, document) in &keyed {
            if entries.len() == MAX_ENTRIES_PER_REQUEST {
                break;
            }
            if succeeded.contains(key) {
                continue;
            }
            keys.push(key.clone());
            entries.push(PutEventsEntry {
                source: SOURCE.to_string(),
                detail_type: DETAIL_TYPE.to_string(),
                detail: (*document).clone(),
                event_bus_name: event_bus_name.to_string(),
            });
        }

        let results = client.publish(&entries).await?;
        let mut failed = Vec::new();
        for (key, result) in keys.into_iter().zip(results) {
            if result.accepted() {
                succeeded.insert(key);
            } else {
                failed.push(key);
            }
        }

        if !failed.is_empty() {
            warn!(failed_keys = ?failed, "event bus rejected entries");
            return Err(LogAlertError::PublishRejected(failed.join(", ")));
        }
        debug!(accepted = succeeded.len(), total = all.len(), "chunk accepted");
    }

    Ok(documents.len())
}
