//! Identifiers for points events and submissions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::DomainError;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// Generate a new UUIDv7-based identifier
            pub fn new() -> Self {
                Self(uuid::Uuid::now_v7())
            }

            /// Wrap an existing UUID (storage layer deserialization)
            pub fn from_uuid(value: uuid::Uuid) -> Self {
                Self(value)
            }

            /// Get the underlying UUID
            pub fn as_uuid(&self) -> &uuid::Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                uuid::Uuid::parse_str(s.trim())
                    .map(Self)
                    .map_err(|e| DomainError::validation(format!(
                        "Invalid {} '{}': {}", stringify!($name), s, e
                    )))
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for a single points event
    ///
    /// UUIDv7 keeps identifiers chronologically sortable, so events listed by
    /// id come back in creation order.
    EventId
);

uuid_id!(
    /// Unique identifier for a submission
    SubmissionId
);
