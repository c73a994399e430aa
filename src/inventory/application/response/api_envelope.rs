//! The inventory collaborator's shared response envelope.

use crate::core::domain::error::{FleetError, FleetResult};
use serde::Deserialize;

/// Wire envelope shared by every collaborator endpoint:
/// `{ success, message?, data?, error? }`.
///
/// A `success: false` envelope is translated into `FleetError::Api` at this
/// boundary so callers never branch on the envelope shape directly.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Unwraps a data-carrying envelope.
    ///
    /// # Errors
    /// Returns `FleetError::Api` if the envelope reports failure or omits
    /// its data on success. `fallback` is used when the backend sent no
    /// error message.
    pub fn require_data(self, fallback: &str) -> FleetResult<T> {
        if !self.success {
            return Err(FleetError::Api(self.failure_message(fallback)));
        }
        self.data
            .ok_or_else(|| FleetError::Api(format!("{}: response missing data", fallback)))
    }

    /// Unwraps an envelope whose data, if any, is irrelevant (e.g. DELETE).
    ///
    /// # Errors
    /// Returns `FleetError::Api` if the envelope reports failure.
    pub fn ack(self, fallback: &str) -> FleetResult<()> {
        if !self.success {
            return Err(FleetError::Api(self.failure_message(fallback)));
        }
        Ok(())
    }

    fn failure_message(&self, fallback: &str) -> String {
        self.error
            .clone()
            .or_else(|| self.message.clone())
            .unwrap_or_else(|| fallback.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_with_data() {
        let envelope: ApiEnvelope<u32> =
            serde_json::from_str(r#"{"success": true, "data": 7}"#).unwrap();
        assert_eq!(envelope.require_data("Failed").unwrap(), 7);
    }

    #[test]
    fn test_failure_uses_error_field() {
        let envelope: ApiEnvelope<u32> =
            serde_json::from_str(r#"{"success": false, "error": "server not found"}"#).unwrap();
        let err = envelope.require_data("Failed to fetch server").unwrap_err();
        assert!(matches!(err, FleetError::Api(msg) if msg == "server not found"));
    }

    #[test]
    fn test_failure_falls_back_to_default_message() {
        let envelope: ApiEnvelope<u32> = serde_json::from_str(r#"{"success": false}"#).unwrap();
        let err = envelope.require_data("Failed to fetch server").unwrap_err();
        assert!(matches!(err, FleetError::Api(msg) if msg == "Failed to fetch server"));
    }

    #[test]
    fn test_success_without_data_is_an_error_when_required() {
        let envelope: ApiEnvelope<u32> = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(envelope.require_data("Failed").is_err());
    }

    #[test]
    fn test_ack_ignores_missing_data() {
        let envelope: ApiEnvelope<serde_json::Value> =
            serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(envelope.ack("Failed to delete server").is_ok());
    }
}
