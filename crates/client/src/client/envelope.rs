//! Response envelope shared by every service endpoint

use super::error::ClientError;
use serde::Deserialize;
use serde_json::Value as JsonValue;

/// Code the service sets on a 401 caused by an expired access token
pub const TOKEN_EXPIRED: &str = "TOKEN_EXPIRED";

/// The `{success, code, message, data}` body every endpoint speaks
///
/// `status` is filled in by the client after receipt; it is not part of
/// the wire body.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<JsonValue>,
    #[serde(skip)]
    pub status: u16,
}

impl ApiEnvelope {
    /// True for 2xx statuses
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// True when the service flagged the access token as expired
    pub fn is_token_expired(&self) -> bool {
        self.status == 401 && self.code.as_deref() == Some(TOKEN_EXPIRED)
    }

    /// Server-supplied message, or a generic one derived from the status
    pub fn message_or_status(&self) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| format!("HTTP error! status: {}", self.status))
    }

    /// Decode the `data` payload into a typed value
    ///
    /// Absent `data` decodes as JSON null, so optional payloads can be
    /// requested as `Option<T>`.
    pub fn data_as<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.data.clone().unwrap_or(JsonValue::Null))
    }

    /// Treat a `success: false` body as an API error even under 2xx
    pub fn require_success(self) -> Result<Self, ClientError> {
        if self.success {
            Ok(self)
        } else {
            Err(ClientError::Api {
                status: self.status,
                message: self.message_or_status(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(status: u16, body: &str) -> ApiEnvelope {
        let mut envelope: ApiEnvelope = serde_json::from_str(body).unwrap();
        envelope.status = status;
        envelope
    }

    #[test]
    fn expired_marker_requires_both_status_and_code() {
        assert!(envelope(401, r#"{"code": "TOKEN_EXPIRED"}"#).is_token_expired());
        assert!(!envelope(403, r#"{"code": "TOKEN_EXPIRED"}"#).is_token_expired());
        assert!(!envelope(401, r#"{"message": "nope"}"#).is_token_expired());
    }

    #[test]
    fn message_falls_back_to_status_text() {
        assert_eq!(
            envelope(500, r#"{"success": false}"#).message_or_status(),
            "HTTP error! status: 500"
        );
        assert_eq!(
            envelope(400, r#"{"message": "Bad input"}"#).message_or_status(),
            "Bad input"
        );
    }

    #[test]
    fn missing_data_decodes_as_none() {
        let payload: Option<Vec<String>> = envelope(200, r#"{"success": true}"#)
            .data_as()
            .unwrap();
        assert_eq!(payload, None);
    }
}
