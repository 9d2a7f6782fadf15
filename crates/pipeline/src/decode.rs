use std::io::Read;

use base64::Engine;
use flate2::read::GzDecoder;
use logalert_core::error::{LogAlertError, Result};
use logalert_core::model::batch::{LogBatch, RawLogRecord};
use serde::Deserialize;

/// Outer envelope as delivered by the log subscription:
/// `{"awslogs": {"data": "<base64 of gzip of JSON>"}}`.
#[derive(Deserialize)]
struct Envelope {
    awslogs: EnvelopeData,
}

#[derive(Deserialize)]
struct EnvelopeData {
    data: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InnerBatch {
    log_group: String,
    log_stream: String,
    log_events: Vec<InnerEvent>,
}

#[derive(Deserialize)]
struct InnerEvent {
    id: String,
    timestamp: i64,
    message: String,
}

/// Decodes one compressed, base64-encoded envelope into a [`LogBatch`].
///
/// Every failure along the way (outer JSON, base64, gzip, inner JSON) is a
/// `MalformedEnvelope` and aborts the whole invocation; there are no partial
/// batches.
pub fn decode_envelope(envelope: &str) -> Result<LogBatch> {
    let outer: Envelope = serde_json::from_str(envelope)
        .map_err(|e| LogAlertError::MalformedEnvelope(format!("outer json: {e}")))?;

    let compressed = base64::engine::general_purpose::STANDARD
        .decode(outer.awslogs.data.trim())
        .map_err(|e| LogAlertError::MalformedEnvelope(format!("base64: {e}")))?;

    let mut decoder = GzDecoder::new(compressed.as_slice());
    let mut decompressed = String::new();
    decoder
        .read_to_string(&mut decompressed)
        .map_err(|e| LogAlertError::MalformedEnvelope(format!("gzip: {e}")))?;

    let inner: InnerBatch = serde_json::from_str(&decompressed)
        .map_err(|e| LogAlertError::MalformedEnvelope(format!("inner json: {e}")))?;

    Ok(LogBatch {
        log_group: inner.log_group,
        log_stream: inner.log_stream,
        records: inner
            .log_events
            .into_iter()
            .map(|e| RawLogRecord {
                id: e.id,
                timestamp: e.timestamp,
                message: e.message,
            })
            .collect(),
    })
}
