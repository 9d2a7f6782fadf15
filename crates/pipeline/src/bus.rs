use std::time::Duration;

use logalert_core::error::{LogAlertError, Result};
use serde::{Deserialize, Serialize};

/// One entry of a publish request, in the destination's wire casing.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PutEventsEntry {
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "DetailType")]
    pub detail_type: String,
    #[serde(rename = "Detail")]
    pub detail: String,
    #[serde(rename = "EventBusName")]
    pub event_bus_name: String,
}

/// Per-entry result, mirroring request order. Acceptance is marked by the
/// presence of an assigned event id; the error code/message is carried for
/// operators but not otherwise interpreted.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PublishResult {
    #[serde(rename = "EventId")]
    pub event_id: Option<String>,
    #[serde(rename = "ErrorCode")]
    pub error_code: Option<String>,
    #[serde(rename = "ErrorMessage")]
    pub error_message: Option<String>,
}

impl PublishResult {
    pub fn accepted(&self) -> bool {
        self.event_id.is_some()
    }
}

/// Seam to the destination event bus. Implementations must return one result
/// per submitted entry, in request order.
pub trait EventBusClient {
    fn publish(
        &self,
        entries: &[PutEventsEntry],
    ) -> impl Future<Output = Result<Vec<PublishResult>>> + Send;
}

#[derive(Serialize)]
struct PutEventsRequest<'a> {
    #[serde(rename = "Entries")]
    entries: &'a [PutEventsEntry],
}

#[derive(Deserialize)]
struct PutEventsResponse {
    #[serde(rename = "Entries")]
    entries: Vec<PublishResult>,
}

/// HTTP client speaking the `PutEvents` JSON wire shape against a configured
/// endpoint. Transport-level retries stay the transport's business; this
/// client observes only the per-entry outcome.
pub struct HttpBusClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpBusClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| LogAlertError::Transport(format!("building http client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }
}

impl EventBusClient for HttpBusClient {
    async fn publish(&self, entries: &[PutEventsEntry]) -> Result<Vec<PublishResult>> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("content-type", "application/x-amz-json-1.1")
            .header("x-amz-target", "AWSEvents.PutEvents")
            .json(&PutEventsRequest { entries })
            .send()
            .await
            .map_err(|e| LogAlertError::Transport(format!("put events request: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LogAlertError::Transport(format!(
                "put events returned {status}"
            )));
        }

        let parsed: PutEventsResponse = response
            .json()
            .await
            .map_err(|e| LogAlertError::Transport(format!("put events response: {e}")))?;

        if parsed.entries.len() != entries.len() {
            return Err(LogAlertError::Transport(format!(
                "put events answered {} results for {} entries",
                parsed.entries.len(),
                entries.len()
            )));
        }
        Ok(parsed.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_serializes_in_wire_casing() {
        let entry = PutEventsEntry {
            source: "logalert".to_string(),
            detail_type: "log-alert".to_string(),
            detail: "{\"blocks\":[]}".to_string(),
            event_bus_name: "alerts".to_string(),
        };
        let wire = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            wire,
            serde_json::json!({
                "Source": "logalert",
                "DetailType": "log-alert",
                "Detail": "{\"blocks\":[]}",
                "EventBusName": "alerts",
            })
        );
    }

    #[test]
    fn acceptance_is_presence_of_an_event_id() {
        let accepted: PublishResult =
            serde_json::from_str(r#"{"EventId":"01234"}"#).unwrap();
        assert!(accepted.accepted());

        let rejected: PublishResult =
            serde_json::from_str(r#"{"ErrorCode":"ThrottlingException","ErrorMessage":"slow down"}"#)
                .unwrap();
        assert!(!rejected.accepted());
        assert_eq!(rejected.error_code.as_deref(), Some("ThrottlingException"));
    }
}
