use serde::{Deserialize, Serialize};

/// One decoded envelope: the source identifiers plus the ordered records.
/// Record order is insertion order as delivered and is preserved end-to-end;
/// the publish key of a record is its index in `records`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogBatch {
    pub log_group: String,
    pub log_stream: String,
    pub records: Vec<RawLogRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawLogRecord {
    pub id: String,
    /// Millisecond epoch timestamp.
    pub timestamp: i64,
    /// Raw text payload; may or may not be JSON.
    pub message: String,
}
