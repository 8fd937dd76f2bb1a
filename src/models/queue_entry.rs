//! One patient's position and state in a service queue.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::utils::string_or_number;

/// Canonical queue-entry status.
///
/// The backend has used several spellings for the same state over time
/// (`"in-progress"`, `"IN_PROGRESS"`, `"onProcess"`, ...). Everything is
/// folded into this fixed set at the deserialization boundary; rendering
/// and filtering code only ever sees the canonical tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueStatus {
    /// Still in the waiting sequence.
    Waiting,
    /// Currently being served (also arrives as `called` / `onProcess`).
    InProgress,
    /// Finished.
    Completed,
    /// Cancelled by the patient or an admin.
    Cancelled,
    /// Called but never showed up.
    Missed,
}

impl QueueStatus {
    /// Parse a wire spelling into the canonical set.
    ///
    /// Matching is case-insensitive and ignores hyphens, underscores and
    /// spaces, so `"in-progress"`, `"IN_PROGRESS"` and `"onProcess"` all
    /// normalize to [`QueueStatus::InProgress`]. Returns `None` for
    /// spellings outside the known set.
    pub fn parse(raw: &str) -> Option<Self> {
        let folded: String = raw
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_lowercase();

        match folded.as_str() {
            "waiting" => Some(Self::Waiting),
            "inprogress" | "onprocess" | "called" | "current" | "serving" => Some(Self::InProgress),
            "completed" | "done" => Some(Self::Completed),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            "missed" | "noshow" => Some(Self::Missed),
            _ => None,
        }
    }

    /// Canonical wire token for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Missed => "missed",
        }
    }
}

impl fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for QueueStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for QueueStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        // Unknown spellings degrade to Waiting rather than failing the whole
        // payload; validating individual entries is the consumer's job.
        Ok(Self::parse(&raw).unwrap_or(Self::Waiting))
    }
}

/// One entry in an institution's queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntry {
    /// Server-assigned identifier. Numeric or string on the wire.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,

    /// Display number shown to patients (e.g. `"A012"` or `"17"`).
    #[serde(deserialize_with = "string_or_number")]
    pub number: String,

    /// Patient display name.
    pub name: String,

    /// Normalized status.
    pub status: QueueStatus,

    /// Free-form estimate (e.g. `"15 menit"`), when the server provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<String>,
}

impl QueueEntry {
    /// The display number as an integer, when it is purely numeric.
    ///
    /// Used by the display ordering rule: numeric numbers sort ascending,
    /// non-numeric numbers keep the server-provided order.
    pub fn numeric_number(&self) -> Option<u64> {
        self.number.trim().parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_status_spellings_normalize() {
        for raw in ["in-progress", "IN_PROGRESS", "onProcess", "in progress", "called"] {
            assert_eq!(
                QueueStatus::parse(raw),
                Some(QueueStatus::InProgress),
                "spelling {raw:?} must normalize to in-progress"
            );
        }
        assert_eq!(QueueStatus::parse("Waiting"), Some(QueueStatus::Waiting));
        assert_eq!(QueueStatus::parse("canceled"), Some(QueueStatus::Cancelled));
        assert_eq!(QueueStatus::parse("NO_SHOW"), Some(QueueStatus::Missed));
        assert_eq!(QueueStatus::parse("teleported"), None);
    }

    #[test]
    fn test_entry_deserializes_camel_case_and_numeric_id() {
        let entry: QueueEntry = serde_json::from_str(
            r#"{"id":7,"number":"A007","name":"Siti","status":"onProcess","estimatedTime":"5 menit"}"#,
        )
        .unwrap();
        assert_eq!(entry.id, "7");
        assert_eq!(entry.status, QueueStatus::InProgress);
        assert_eq!(entry.estimated_time.as_deref(), Some("5 menit"));
    }

    #[test]
    fn test_entry_unknown_status_falls_back_to_waiting() {
        let entry: QueueEntry =
            serde_json::from_str(r#"{"id":"1","number":"B001","name":"Adi","status":"???"}"#)
                .unwrap();
        assert_eq!(entry.status, QueueStatus::Waiting);
        assert!(entry.estimated_time.is_none());
    }

    #[test]
    fn test_status_serializes_canonical_token() {
        assert_eq!(
            serde_json::to_string(&QueueStatus::InProgress).unwrap(),
            r#""in-progress""#
        );
    }

    #[test]
    fn test_numeric_number() {
        let mut entry: QueueEntry =
            serde_json::from_str(r#"{"id":"1","number":"17","name":"Adi","status":"waiting"}"#)
                .unwrap();
        assert_eq!(entry.numeric_number(), Some(17));
        entry.number = "A017".to_string();
        assert_eq!(entry.numeric_number(), None);
    }
}
