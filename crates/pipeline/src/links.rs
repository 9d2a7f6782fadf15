//! Console deep-link builders. Pure string work, no I/O.
//!
//! The log-viewer console routes the fragment through its own indirection
//! layer, so group/stream names and the query are escaped with `$25`-style
//! double encoding. The exact byte sequences are an external contract; the
//! expected URLs in the tests below are taken from links the console
//! actually accepts.

/// Window opens 15 minutes before the event so that slow/timeout failures,
/// which log near invocation end, stay in view.
const LOOKBACK_MS: i64 = 900_000;
/// Trailing margin for clock skew between producer and viewer.
const LOOKAHEAD_MS: i64 = 10_000;

/// Console page of the originating function.
pub fn function_console_url(function_name: &str, region: &str) -> String {
    format!(
        "https://{region}.console.aws.amazon.com/lambda/home?region={region}#/functions/{function_name}"
    )
}

/// Deep link into the log viewer, scoped to one stream.
///
/// With a request id the query is an exact-match filter on that id (quoted,
/// no time window); without one it is a time window of exactly
/// `LOOKBACK_MS + LOOKAHEAD_MS` around the record timestamp.
pub fn log_events_url(
    region: &str,
    log_group: &str,
    log_stream: &str,
    timestamp: i64,
    request_id: Option<&str>,
) -> String {
    let query = match request_id {
        Some(id) => format!("$3FfilterPattern$3D{}", console_escape(&format!("\"{id}\""))),
        None => format!(
            "$3Fstart$3D{}$26end$3D{}",
            timestamp - LOOKBACK_MS,
            timestamp + LOOKAHEAD_MS
        ),
    };

    format!(
        "https://{region}.console.aws.amazon.com/cloudwatch/home?region={region}\
         #logsV2:log-groups/log-group/{}/log-events/{}{query}",
        console_escape(log_group),
        console_escape(log_stream),
    )
}

/// Final path segment of a `/`-delimited group name.
pub fn function_name_of(log_group: &str) -> &str {
    log_group.rsplit('/').next().unwrap_or(log_group)
}

/// Percent-encodes every byte outside the unreserved set, then substitutes
/// `$25` for `%` (the console decodes twice).
fn console_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("$25{byte:02X}")),
        }
    }
    out
}
