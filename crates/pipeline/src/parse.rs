use logalert_core::error::{LogAlertError, Result};
use logalert_core::model::batch::RawLogRecord;
use logalert_core::model::message::ParsedMessage;
use serde_json::Value;

/// Maximum characters kept from the message text and the error summary.
const MAX_TEXT_CHARS: usize = 300;

/// Converts one raw record into a structured [`ParsedMessage`].
///
/// A payload that is not valid JSON degrades to the raw-text fallback: no
/// request id, no error summary, message = first 300 characters of the raw
/// text. A payload that *is* valid JSON but lacks the `message` field is a
/// producer contract violation and propagates as `FieldMissing` instead.
pub fn parse_record(record: &RawLogRecord) -> Result<ParsedMessage> {
    let Ok(data) = serde_json::from_str::<Value>(&record.message) else {
        return Ok(ParsedMessage {
            request_id: None,
            timestamp: record.timestamp,
            message: truncate_chars(&record.message, MAX_TEXT_CHARS),
            error_summary: None,
        });
    };

    let request_id = data
        .get("function_request_id")
        .and_then(Value::as_str)
        .map(str::to_string);

    let message = data
        .get("message")
        .ok_or_else(|| LogAlertError::FieldMissing("message".to_string()))?;
    let message = truncate_chars(&value_text(message), MAX_TEXT_CHARS);

    let error_summary = match data.get("stack_trace") {
        Some(trace) => Some(summarize_stack_trace(trace)?),
        None => None,
    };

    Ok(ParsedMessage {
        request_id,
        timestamp: record.timestamp,
        message,
        error_summary,
    })
}

/// `"[{module}.{type}] {value}"`, truncated like the message text.
fn summarize_stack_trace(trace: &Value) -> Result<String> {
    let module = trace_field(trace, "module")?;
    let kind = trace_field(trace, "type")?;
    let value = trace_field(trace, "value")?;
    Ok(truncate_chars(
        &format!("[{module}.{kind}] {value}"),
        MAX_TEXT_CHARS,
    ))
}

fn trace_field(trace: &Value, name: &str) -> Result<String> {
    trace
        .get(name)
        .map(value_text)
        .ok_or_else(|| LogAlertError::FieldMissing(format!("stack_trace.{name}")))
}

/// String values verbatim; anything else as compact JSON.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Truncation counts characters, not bytes; no marker is appended.
fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(message: &str) -> RawLogRecord {
        RawLogRecord {
            id: "e1".to_string(),
            timestamp: 1_712_810_238_551,
            message: message.to_string(),
        }
    }

    #[test]
    fn non_json_message_falls_back_to_raw_text() {
        let parsed = parse_record(&record("Task timed out after 180.10 seconds")).unwrap();
        assert_eq!(parsed.request_id, None);
        assert_eq!(parsed.message, "Task timed out after 180.10 seconds");
        assert_eq!(parsed.error_summary, None);
        assert_eq!(parsed.timestamp, 1_712_810_238_551);
    }

    #[test]
    fn long_raw_text_is_cut_at_300_chars() {
        let long = "x".repeat(500);
        let parsed = parse_record(&record(&long)).unwrap();
        assert_eq!(parsed.message.chars().count(), 300);
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let long = "あ".repeat(400);
        let parsed = parse_record(&record(&long)).unwrap();
        assert_eq!(parsed.message.chars().count(), 300);
        assert_eq!(parsed.message, "あ".repeat(300));
    }

    #[test]
    fn structured_record_without_trace() {
        let parsed = parse_record(&record(
            r#"{"message":"handler done","function_request_id":"abc"}"#,
        ))
        .unwrap();
        assert_eq!(parsed.request_id, Some("abc".to_string()));
        assert_eq!(parsed.message, "handler done");
        assert_eq!(parsed.error_summary, None);
    }

    #[test]
    fn request_id_is_optional() {
        let parsed = parse_record(&record(r#"{"message":"cold start"}"#)).unwrap();
        assert_eq!(parsed.request_id, None);
        assert_eq!(parsed.message, "cold start");
    }

    #[test]
    fn stack_trace_is_summarized() {
        let parsed = parse_record(&record(
            r#"{
                "message": "error occurred in handler: name 'Error' is not defined",
                "function_request_id": "abc",
                "stack_trace": {
                    "module": "builtins",
                    "type": "NameError",
                    "value": "name 'Error' is not defined"
                }
            }"#,
        ))
        .unwrap();
        assert_eq!(parsed.request_id, Some("abc".to_string()));
        assert_eq!(
            parsed.error_summary.as_deref(),
            Some("[builtins.NameError] name 'Error' is not defined")
        );
    }

    #[test]
    fn error_summary_is_truncated_independently_of_message() {
        let value = "v".repeat(400);
        let raw = format!(
            r#"{{"message":"short","stack_trace":{{"module":"m","type":"T","value":"{value}"}}}}"#
        );
        let parsed = parse_record(&record(&raw)).unwrap();
        assert_eq!(parsed.message, "short");
        assert_eq!(parsed.error_summary.unwrap().chars().count(), 300);
    }

    #[test]
    fn non_string_message_is_serialized_compactly() {
        let parsed = parse_record(&record(r#"{"message":{"detail":1}}"#)).unwrap();
        assert_eq!(parsed.message, r#"{"detail":1}"#);
    }

    #[test]
    fn missing_message_field_propagates() {
        let err = parse_record(&record(r#"{"level":"ERROR"}"#)).unwrap_err();
        assert!(matches!(err, LogAlertError::FieldMissing(ref f) if f == "message"));
    }

    #[test]
    fn incomplete_stack_trace_propagates() {
        let err = parse_record(&record(
            r#"{"message":"boom","stack_trace":{"module":"builtins"}}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, LogAlertError::FieldMissing(ref f) if f == "stack_trace.type"));
    }
}
