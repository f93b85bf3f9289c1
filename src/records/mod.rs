//! Record endpoints backing the membership product: contacts, memberships and
//! PowerPlay sessions. All of them persist through the same [`KeyValueStore`]
//! as the generation cache, each in its own table.
//!
//! [`KeyValueStore`]: crate::store::KeyValueStore

pub mod memberships;
pub mod powerplays;
pub mod users;

pub use memberships::{Membership, MembershipInput, MembershipRecords};
pub use powerplays::PowerplayRecords;
pub use users::{User, UserInput, UserRecords};

use serde::{Deserialize, Deserializer, de};
use serde_json::Value;

use crate::error::GatewayError;

/// Lowercases and trims an email, rejecting it when nothing is left.
pub fn normalize_email(raw: Option<&str>) -> Result<String, GatewayError> {
    let email = raw.unwrap_or_default().trim().to_lowercase();
    if email.is_empty() {
        return Err(GatewayError::validation("Missing required field: email"));
    }
    Ok(email)
}

pub(crate) fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Integer field that clients send either as a number or as a numeric string.
#[derive(Debug, Clone, PartialEq)]
pub enum IntLike {
    Int(i64),
    Float(f64),
    Text(String),
}

// Decoded through `Value` because untagged enums cannot see arbitrary-precision numbers
impl<'de> Deserialize<'de> for IntLike {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => Ok(Self::Int(i)),
                (None, Some(f)) => Ok(Self::Float(f)),
                (None, None) => Err(de::Error::custom(format!("unsupported number {}", n))),
            },
            Value::String(s) => Ok(Self::Text(s)),
            other => Err(de::Error::custom(format!(
                "expected a number or numeric string, got {}",
                other
            ))),
        }
    }
}

impl IntLike {
    pub fn to_i64(&self, field: &str) -> Result<i64, GatewayError> {
        match self {
            Self::Int(n) => Ok(*n),
            Self::Float(f) if f.is_finite() => Ok(f.trunc() as i64),
            Self::Text(s) => s.trim().parse::<i64>().map_err(|_| {
                GatewayError::validation(format!("Field '{}' must be an integer", field))
            }),
            Self::Float(_) => Err(GatewayError::validation(format!(
                "Field '{}' must be an integer",
                field
            ))),
        }
    }
}
