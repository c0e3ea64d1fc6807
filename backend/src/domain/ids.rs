//! Strongly typed UUID identifiers for domain records.
//!
//! Each record kind gets its own newtype so an event id can never be passed
//! where a complaint id is expected.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error raised when an identifier string is not a UUID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} must be a valid UUID")]
pub struct IdParseError {
    kind: &'static str,
}

impl IdParseError {
    /// Name of the identifier kind that failed to parse.
    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Parse an identifier from its canonical string form.
            pub fn new(raw: impl AsRef<str>) -> Result<Self, IdParseError> {
                let raw = raw.as_ref();
                if raw.trim() != raw {
                    return Err(IdParseError { kind: $kind });
                }
                Uuid::parse_str(raw)
                    .map(Self)
                    .map_err(|_| IdParseError { kind: $kind })
            }

            /// Generate a new random identifier.
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Access the underlying UUID.
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl std::str::FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

uuid_identifier!(
    /// Stable user identifier.
    UserId,
    "user id"
);
uuid_identifier!(
    /// Hostel identifier.
    HostelId,
    "hostel id"
);
uuid_identifier!(
    /// Event identifier.
    EventId,
    "event id"
);
uuid_identifier!(
    /// Complaint identifier.
    ComplaintId,
    "complaint id"
);
uuid_identifier!(
    /// Leave request identifier.
    LeaveRequestId,
    "leave request id"
);
uuid_identifier!(
    /// Notification identifier.
    NotificationId,
    "notification id"
);
uuid_identifier!(
    /// Mess menu entry identifier.
    MessMenuId,
    "mess menu id"
);
uuid_identifier!(
    /// Mess attendance mark identifier.
    AttendanceId,
    "attendance id"
);
uuid_identifier!(
    /// Mess feedback identifier.
    FeedbackId,
    "feedback id"
);
uuid_identifier!(
    /// Backup identifier.
    BackupId,
    "backup id"
);

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn parses_canonical_uuid() {
        let id = EventId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("valid id");
        assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    }

    #[rstest]
    #[case("")]
    #[case("not-a-uuid")]
    #[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    fn rejects_malformed_values(#[case] raw: &str) {
        let err = ComplaintId::new(raw).expect_err("invalid id");
        assert_eq!(err.kind(), "complaint id");
        assert_eq!(err.to_string(), "complaint id must be a valid UUID");
    }

    #[rstest]
    fn serialises_as_bare_string() {
        let id = HostelId::from_uuid(Uuid::nil());
        let json = serde_json::to_value(id).expect("serialise id");
        assert_eq!(json, serde_json::json!("00000000-0000-0000-0000-000000000000"));
    }
}
