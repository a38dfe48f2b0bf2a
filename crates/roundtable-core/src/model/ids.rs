// ── Core identity types ──
//
// String-backed newtypes for the four identifier kinds in the platform.
// The backend hands out opaque ids (UUIDs in newer tables, numeric
// strings in older ones); these types never inspect the format, they
// only guarantee non-blankness.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident, $field:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Validate and wrap a raw identifier. Blank input is
            /// rejected before it can reach the wire or a cache key.
            pub fn new(raw: impl Into<String>) -> Result<Self, CoreError> {
                let raw = raw.into();
                if raw.trim().is_empty() {
                    return Err(CoreError::InvalidInput {
                        field: $field,
                        reason: "identifier must not be empty".into(),
                    });
                }
                Ok(Self(raw))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// A discussion venue (room) managed by an administrator.
    VenueId,
    "venue_id"
);

string_id!(
    /// A group-discussion session.
    SessionId,
    "session_id"
);

string_id!(
    /// A platform user -- the acting admin/student, or a peer being
    /// ranked in the survey.
    UserId,
    "user_id"
);

string_id!(
    /// An admission QR code.
    QrId,
    "qr_id"
);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn blank_ids_are_rejected() {
        assert!(VenueId::new("").is_err());
        assert!(SessionId::new("   ").is_err());
        assert!(UserId::new("\t").is_err());
    }

    #[test]
    fn valid_id_round_trips() {
        let id = SessionId::new("sess-42").unwrap();
        assert_eq!(id.as_str(), "sess-42");
        assert_eq!(id.to_string(), "sess-42");
    }

    #[test]
    fn serde_is_transparent() {
        let id: QrId = serde_json::from_str("\"qr-1\"").unwrap();
        assert_eq!(id, QrId::new("qr-1").unwrap());
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"qr-1\"");
    }
}
