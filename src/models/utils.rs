//! Small deserialization helpers shared by the wire models.

use serde::{Deserialize, Deserializer};

/// Accept a JSON string or number and normalize to `String`.
///
/// Queue and institution identifiers arrive as numbers from some backend
/// versions and as strings from others; the client treats them uniformly
/// as opaque strings.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Str(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Repr::deserialize(deserializer)? {
        Repr::Str(s) => s,
        Repr::Int(n) => n.to_string(),
        Repr::Float(f) => f.to_string(),
    })
}
