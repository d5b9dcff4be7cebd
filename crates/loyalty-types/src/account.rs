use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A loyalty member account.
///
/// Stored in ledger state under its `account_number`. The `points` balance is
/// the only field that changes after creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub account_number: String,
    pub card_id: String,
    /// Current point balance. Never negative for a committed member.
    #[serde(default)]
    pub points: i64,
}

impl Member {
    /// Decode a stored value.
    ///
    /// Returns `Ok(None)` if the bytes are JSON but not a member record (a
    /// partner, or a journal array). Errors only for malformed bytes or a
    /// member record with missing or mistyped fields.
    pub fn from_record(bytes: &[u8]) -> Result<Option<Self>, TypeError> {
        decode_record(bytes, "accountNumber")
    }

    /// Full display name ("first last").
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A partner business where points are earned or spent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partner {
    pub name: String,
    #[serde(rename = "partnerId")]
    pub id: String,
    #[serde(rename = "cardId")]
    pub card_id: String,
}

impl Partner {
    /// Decode a stored value; `Ok(None)` if it is not a partner record.
    pub fn from_record(bytes: &[u8]) -> Result<Option<Self>, TypeError> {
        decode_record(bytes, "partnerId")
    }
}

/// Records are told apart by their key field.
fn decode_record<T: DeserializeOwned>(
    bytes: &[u8],
    key_field: &str,
) -> Result<Option<T>, TypeError> {
    let value: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|e| TypeError::Serialization(e.to_string()))?;
    if value.get(key_field).is_none() {
        return Ok(None);
    }
    serde_json::from_value(value)
        .map(Some)
        .map_err(|e| TypeError::Serialization(e.to_string()))
}
