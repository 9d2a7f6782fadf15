use chrono::{DateTime, FixedOffset, Utc};
use logalert_core::config::Config;
use logalert_core::error::Result;
use logalert_core::model::batch::LogBatch;
use tracing::debug;

use crate::bus::EventBusClient;
use crate::decode::decode_envelope;
use crate::links::{function_console_url, function_name_of, log_events_url};
use crate::observe::{observed, observed_sync};
use crate::parse::parse_record;
use crate::publish::publish_batch;
use crate::render::{render_notification, render_offset};

/// Renders every record of a decoded batch into its notification document,
/// in record order.
pub fn render_documents(
    batch: &LogBatch,
    cfg: &Config,
    rendered_at: DateTime<FixedOffset>,
) -> Result<Vec<String>> {
    let function_name = function_name_of(&batch.log_group);
    let function_url = function_console_url(function_name, &cfg.region);

    let mut documents = Vec::with_capacity(batch.records.len());
    for (index, record) in batch.records.iter().enumerate() {
        let message = parse_record(record)?;
        let logs_url = log_events_url(
            &cfg.region,
            &batch.log_group,
            &batch.log_stream,
            message.timestamp,
            message.request_id.as_deref(),
        );
        let document = render_notification(
            &batch.log_group,
            &batch.log_stream,
            &cfg.system_name,
            &message,
            &function_url,
            &logs_url,
            rendered_at,
        )?;
        debug!(index, bytes = document.len(), "rendered notification");
        documents.push(document);
    }
    Ok(documents)
}

/// Runs the whole pipeline for one envelope: decode, render each record,
/// publish the collected documents. Returns the number of published
/// documents.
pub async fn process_envelope<C: EventBusClient>(
    envelope: &str,
    cfg: &Config,
    client: &C,
) -> Result<usize> {
    let batch = observed_sync("decode_envelope", || decode_envelope(envelope))?;
    debug!(
        log_group = %batch.log_group,
        log_stream = %batch.log_stream,
        records = batch.records.len(),
        "decoded envelope"
    );

    let rendered_at = Utc::now().with_timezone(&render_offset());
    let documents =
        observed_sync("render_documents", || render_documents(&batch, cfg, rendered_at))?;

    observed(
        "publish_batch",
        publish_batch(client, &documents, &cfg.event_bus_name),
    )
    .await
}
