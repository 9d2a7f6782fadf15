use std::time::Instant;

use logalert_core::error::Result;
use tracing::{debug, error};
use uuid::Uuid;

/// Instrumentation wrapper applied at component boundaries: logs duration on
/// success and the error on failure, tagged with a per-call id, and passes
/// the wrapped outcome through unchanged.
pub async fn observed<T, F>(name: &'static str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let call_id = Uuid::new_v4();
    let started = Instant::now();
    match fut.await {
        Ok(value) => {
            debug!(
                call = name,
                call_id = %call_id,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "call succeeded"
            );
            Ok(value)
        }
        Err(e) => {
            error!(
                call = name,
                call_id = %call_id,
                elapsed_ms = started.elapsed().as_millis() as u64,
                error = %e,
                "call failed"
            );
            Err(e)
        }
    }
}

/// Synchronous variant for the pure stages.
pub fn observed_sync<T, F>(name: &'static str, op: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let call_id = Uuid::new_v4();
    let started = Instant::now();
    match op() {
        Ok(value) => {
            debug!(
                call = name,
                call_id = %call_id,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "call succeeded"
            );
            Ok(value)
        }
        Err(e) => {
            error!(
                call = name,
                call_id = %call_id,
                elapsed_ms = started.elapsed().as_millis() as u64,
                error = %e,
                "call failed"
            );
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use logalert_core::error::LogAlertError;

    use super::*;

    #[tokio::test]
    async fn passes_success_through() {
        let value = observed("stage", async { Ok(41 + 1) }).await.unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn passes_errors_through_unchanged() {
        let err = observed::<(), _>("stage", async {
            Err(LogAlertError::FieldMissing("message".to_string()))
        })
        .await
        .unwrap_err();
        assert!(matches!(err, LogAlertError::FieldMissing(ref f) if f == "message"));
    }

    #[test]
    fn sync_variant_preserves_outcomes() {
        assert_eq!(observed_sync("stage", || Ok(7)).unwrap(), 7);
        let err = observed_sync::<(), _>("stage", || {
            Err(LogAlertError::Config("bad".to_string()))
        })
        .unwrap_err();
        assert!(matches!(err, LogAlertError::Config(_)));
    }
}
