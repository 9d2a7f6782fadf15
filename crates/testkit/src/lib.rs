use std::io::Write;

use base64::Engine;
use flate2::Compression;
use flate2::write::GzEncoder;

/// Builds a full outer envelope (`{"awslogs":{"data":...}}`) for the given
/// batch, gzip-compressed and base64-encoded the way the log subscription
/// delivers it. Events are `(id, timestamp_ms, message)` triples.
pub fn encode_envelope(log_group: &str, log_stream: &str, events: &[(&str, i64, &str)]) -> String {
    let inner = serde_json::json!({
        "logGroup": log_group,
        "logStream": log_stream,
        "logEvents": events
            .iter()
            .map(|(id, timestamp, message)| serde_json::json!({
                "id": id,
                "timestamp": timestamp,
                "message": message,
            }))
            .collect::<Vec<_>>(),
    });
    encode_raw_envelope(&inner.to_string())
}

/// Wraps an arbitrary inner JSON document in the compressed envelope; lets
/// tests exercise structurally broken batches.
pub fn encode_raw_envelope(inner_json: &str) -> String {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(inner_json.as_bytes())
        .expect("gzip write cannot fail on a Vec");
    let compressed = encoder.finish().expect("gzip finish cannot fail on a Vec");
    let data = base64::engine::general_purpose::STANDARD.encode(compressed);
    serde_json::json!({"awslogs": {"data": data}}).to_string()
}

/// Raw message of a timed-out invocation, as the runtime logs it (not JSON).
pub fn timeout_message() -> &'static str {
    "2024-04-11T04:37:18.550Z d136f36b-c0b5-4949-88ab-297020017522 \
     Task timed out after 180.10 seconds\n\n"
}

/// Structured error record with a request id and a stack trace, as the
/// service's JSON logger emits it.
pub fn stack_trace_message(request_id: &str) -> String {
    serde_json::json!({
        "level": "ERROR",
        "message": "error occurred in handler: name 'Error' is not defined",
        "function_request_id": request_id,
        "stack_trace": {
            "module": "builtins",
            "type": "NameError",
            "value": "name 'Error' is not defined",
        },
    })
    .to_string()
}
