//! Client-to-server messages on the realtime channel.

use serde::{Deserialize, Serialize};

use crate::error::{MediqLinkError, Result};

use super::wire_frame::WireFrame;

/// Typed client-to-server requests.
///
/// Serializes to the `{"event": ..., "data": {...}}` envelope the server
/// expects; field names are camel-cased on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Ask the server to push queue state changes for one institution.
    #[serde(rename_all = "camelCase")]
    SubscribeQueueUpdates { institution_id: String },

    /// Ask the server to push personal notifications (ready, almost-ready,
    /// called, completed) for a user at an institution.
    #[serde(rename_all = "camelCase")]
    SubscribeNotifications {
        user_id: String,
        institution_id: String,
        types: Vec<String>,
    },

    /// Cancel a previous notification subscription.
    #[serde(rename_all = "camelCase")]
    UnsubscribeNotifications {
        user_id: String,
        institution_id: String,
    },

    /// Request an immediate full snapshot push.
    #[serde(rename_all = "camelCase")]
    GetQueueStatus { institution_id: String },

    /// Rotate the credential on a live connection. `None` clears it.
    AuthUpdate { token: Option<String> },
}

impl ClientMessage {
    /// Convert to the wire envelope.
    pub fn into_frame(self) -> Result<WireFrame> {
        let value = serde_json::to_value(&self)
            .map_err(|e| MediqLinkError::SerializationError(e.to_string()))?;
        serde_json::from_value(value)
            .map_err(|e| MediqLinkError::SerializationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_subscribe_queue_updates_envelope() {
        let msg = ClientMessage::SubscribeQueueUpdates {
            institution_id: "inst-1".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"event": "subscribe_queue_updates", "data": {"institutionId": "inst-1"}})
        );
    }

    #[test]
    fn test_subscribe_notifications_envelope() {
        let msg = ClientMessage::SubscribeNotifications {
            user_id: "u-1".to_string(),
            institution_id: "inst-1".to_string(),
            types: vec!["queue_ready".to_string(), "queue_called".to_string()],
        };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({
                "event": "subscribe_notifications",
                "data": {
                    "userId": "u-1",
                    "institutionId": "inst-1",
                    "types": ["queue_ready", "queue_called"]
                }
            })
        );
    }

    #[test]
    fn test_auth_update_clear_serializes_null() {
        let msg = ClientMessage::AuthUpdate { token: None };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"event": "auth_update", "data": {"token": null}})
        );
    }

    #[test]
    fn test_into_frame() {
        let frame = ClientMessage::GetQueueStatus {
            institution_id: "inst-9".to_string(),
        }
        .into_frame()
        .unwrap();
        assert_eq!(frame.event, "get_queue_status");
        assert_eq!(frame.data, json!({"institutionId": "inst-9"}));
    }
}
