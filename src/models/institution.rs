//! Institution directory entry.

use serde::{Deserialize, Serialize};

use super::utils::string_or_number;

/// One institution from `GET /institutions`. Transported only — the client
/// never derives anything from these fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Institution {
    /// Server-assigned identifier; also the queue-updates topic key.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,

    /// Display name.
    pub name: String,

    /// Street address, when the directory provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_with_numeric_id() {
        let inst: Institution =
            serde_json::from_str(r#"{"id":3,"name":"Puskesmas Melati"}"#).unwrap();
        assert_eq!(inst.id, "3");
        assert!(inst.address.is_none());
    }
}
