use chrono::{DateTime, FixedOffset, TimeZone};
use logalert_core::error::{LogAlertError, Result};
use logalert_core::model::message::ParsedMessage;
use serde::Serialize;

/// Notifications are rendered in JST regardless of where the pipeline runs.
pub fn render_offset() -> FixedOffset {
    FixedOffset::east_opt(9 * 3600).expect("+09:00 is a valid offset")
}

#[derive(Debug, Serialize)]
struct Document {
    blocks: Vec<Block>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Block {
    Section { text: Mrkdwn },
    Divider,
}

#[derive(Debug, Serialize)]
struct Mrkdwn {
    #[serde(rename = "type")]
    kind: &'static str,
    text: String,
}

fn section(text: String) -> Block {
    Block::Section {
        text: Mrkdwn {
            kind: "mrkdwn",
            text,
        },
    }
}

/// Body text goes inside the fence verbatim, embedded newlines included.
/// A body containing the fence delimiter itself will render imperfectly;
/// that is accepted behavior.
fn fenced(text: &str) -> String {
    format!("```\n{text}\n```")
}

/// Composes the notification document for one parsed record.
///
/// Section order is fixed. The request-id section appears iff the message
/// carries one; the error-message sections appear iff a summary is present.
/// `rendered_at` is supplied by the caller so tests stay deterministic.
pub fn render_notification(
    log_group: &str,
    log_stream: &str,
    system_name: &str,
    message: &ParsedMessage,
    function_url: &str,
    logs_url: &str,
    rendered_at: DateTime<FixedOffset>,
) -> Result<String> {
    let event_time = render_offset()
        .timestamp_millis_opt(message.timestamp)
        .single()
        .ok_or_else(|| {
            LogAlertError::MalformedEnvelope(format!(
                "timestamp out of range: {}",
                message.timestamp
            ))
        })?;

    let mut blocks = vec![
        section(format!(
            "<!channel> `{}`",
            rendered_at.format("%Y-%m-%d %H:%M:%S%.6f%:z")
        )),
        Block::Divider,
        section(format!("*System Name:* `{system_name}`")),
        section(format!("*Log Group:* `{log_group}`")),
        section(format!("*Log Stream:* `{log_stream}`")),
        section(format!("*Timestamp:* `{}`", message.timestamp)),
        section(format!(
            "*Datetime:* `{}`",
            event_time.format("%Y-%m-%d %H:%M:%S%.6f%:z")
        )),
    ];

    if let Some(request_id) = &message.request_id {
        blocks.push(section(format!("*Request ID:* `{request_id}`")));
    }

    blocks.push(section(format!("*Function Console:* <{function_url}|link>")));
    blocks.push(section(format!("*CloudWatch Logs:* <{logs_url}|link>")));
    blocks.push(section("*Message:*".to_string()));
    blocks.push(section(fenced(&message.message)));

    if let Some(summary) = &message.error_summary {
        blocks.push(section("*Error Message:*".to_string()));
        blocks.push(section(fenced(summary)));
    }

    serde_json::to_string(&Document { blocks })
        .map_err(|e| LogAlertError::MalformedEnvelope(format!("document serialization: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(request_id: Option<&str>, error_summary: Option<&str>) -> ParsedMessage {
        ParsedMessage {
            request_id: request_id.map(str::to_string),
            timestamp: 1_712_810_238_551,
            message: "Task timed out after 180.10 seconds\n\n".to_string(),
            error_summary: error_summary.map(str::to_string),
        }
    }

    fn render(message: &ParsedMessage) -> serde_json::Value {
        let rendered_at = render_offset()
            .with_ymd_and_hms(2024, 4, 11, 15, 7, 17)
            .unwrap();
        let doc = render_notification(
            "/aws/lambda/threads-dumper",
            "2024/04/11/[$LATEST]3363f595",
            "test",
            message,
            "https://example.com/fn",
            "https://example.com/logs",
            rendered_at,
        )
        .unwrap();
        serde_json::from_str(&doc).unwrap()
    }

    fn section_texts(doc: &serde_json::Value) -> Vec<String> {
        doc["blocks"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|b| b["type"] == "section")
            .map(|b| b["text"]["text"].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn fixed_header_order() {
        let doc = render(&parsed(None, None));
        let blocks = doc["blocks"].as_array().unwrap();
        assert_eq!(blocks[0]["type"], "section");
        assert!(
            blocks[0]["text"]["text"]
                .as_str()
                .unwrap()
                .starts_with("<!channel> `2024-04-11 15:07:17")
        );
        assert_eq!(blocks[1], serde_json::json!({"type": "divider"}));

        let texts = section_texts(&doc);
        assert_eq!(texts[1], "*System Name:* `test`");
        assert_eq!(texts[2], "*Log Group:* `/aws/lambda/threads-dumper`");
        assert_eq!(texts[3], "*Log Stream:* `2024/04/11/[$LATEST]3363f595`");
        assert_eq!(texts[4], "*Timestamp:* `1712810238551`");
        assert_eq!(texts[5], "*Datetime:* `2024-04-11 13:37:18.551000+09:00`");
    }

    #[test]
    fn request_id_section_iff_present() {
        let with = render(&parsed(Some("abc"), None));
        assert!(
            section_texts(&with)
                .iter()
                .any(|t| t == "*Request ID:* `abc`")
        );

        let without = render(&parsed(None, None));
        assert!(
            !section_texts(&without)
                .iter()
                .any(|t| t.starts_with("*Request ID:*"))
        );
    }

    #[test]
    fn error_sections_iff_summary_present() {
        let with = render(&parsed(None, Some("[builtins.NameError] boom")));
        let texts = section_texts(&with);
        let label_at = texts.iter().position(|t| t == "*Error Message:*").unwrap();
        assert_eq!(texts[label_at + 1], "```\n[builtins.NameError] boom\n```");

        let without = render(&parsed(None, None));
        assert!(
            !section_texts(&without)
                .iter()
                .any(|t| t == "*Error Message:*")
        );
    }

    #[test]
    fn message_body_is_fenced_verbatim() {
        let doc = render(&parsed(None, None));
        let texts = section_texts(&doc);
        let label_at = texts.iter().position(|t| t == "*Message:*").unwrap();
        assert_eq!(
            texts[label_at + 1],
            "```\nTask timed out after 180.10 seconds\n\n\n```"
        );
    }

    #[test]
    fn link_sections_reference_both_urls() {
        let doc = render(&parsed(None, None));
        let texts = section_texts(&doc);
        assert!(
            texts
                .iter()
                .any(|t| t == "*Function Console:* <https://example.com/fn|link>")
        );
        assert!(
            texts
                .iter()
                .any(|t| t == "*CloudWatch Logs:* <https://example.com/logs|link>")
        );
    }
}
