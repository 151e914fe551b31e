//! Success envelope shared by every JSON endpoint.

use serde::Serialize;

/// `{ "success": true, "data": ..., "message"?: ... }`
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    /// Always `true`; failures go through [`crate::AppError`]
    pub success: bool,
    /// Payload
    pub data: T,
    /// Optional human-readable note
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Wrap `data` in a success envelope
    #[must_use]
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            message: None,
        }
    }

    /// Attach a message
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn message_is_omitted_when_absent() {
        let json = serde_json::to_value(ApiResponse::ok(3)).unwrap();
        assert_eq!(json, serde_json::json!({ "success": true, "data": 3 }));

        let json = serde_json::to_value(ApiResponse::ok(3).with_message("Booking cancelled")).unwrap();
        assert_eq!(json["message"], "Booking cancelled");
    }
}
