use serde::{Deserialize, Serialize};

/// Structured view of one raw record after best-effort JSON interpretation.
///
/// `error_summary` is present only when the raw payload was valid JSON and
/// carried a recognized stack-trace substructure. Both text fields are
/// truncated to 300 characters (characters, not bytes; no marker appended).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParsedMessage {
    pub request_id: Option<String>,
    pub timestamp: i64,
    pub message: String,
    pub error_summary: Option<String>,
}
