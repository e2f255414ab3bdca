//! Prefixed hash identifiers for board entities
//!
//! ID Format:
//! - Task IDs: `t-{7-char-hash}` (e.g., `t-9d3e5f2`)
//! - Note IDs: `n-{7-char-hash}` (e.g., `n-1a2b3c4`)
//! - Dependency IDs: `d-{7-char-hash}` (e.g., `d-77aa001`)
//! - Activity IDs: `e-{12-char-hash}` (e.g., `e-0123456789ab`)
//!
//! Hash is derived from a seed (title, note content, edge endpoints) plus the
//! creation timestamp, so the same seed at different times yields different IDs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Invalid {kind} ID format: expected '{prefix}-{{{len}-char-hash}}', got '{value}'")]
    Invalid {
        kind: &'static str,
        prefix: &'static str,
        len: usize,
        value: String,
    },
}

/// Generates a `len`-character hex hash from seed and timestamp
fn generate_hash(seed: &str, timestamp: DateTime<Utc>, len: usize) -> String {
    let input = format!("{}{}", seed, timestamp.timestamp_nanos_opt().unwrap_or(0));
    let hash = blake3::hash(input.as_bytes());
    let hex = hash.to_hex();
    hex[..len].to_string()
}

macro_rules! prefixed_id {
    ($(#[$meta:meta])* $name:ident, kind = $kind:literal, prefix = $prefix:literal, len = $len:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name {
            hash: String,
        }

        impl $name {
            /// Prefix written before the hash
            pub const PREFIX: &'static str = $prefix;

            const HASH_LEN: usize = $len;

            /// Creates a new ID from a seed and a creation timestamp
            pub fn new(seed: &str, timestamp: DateTime<Utc>) -> Self {
                Self {
                    hash: generate_hash(seed, timestamp, Self::HASH_LEN),
                }
            }

            /// Like `new`, but reseeds with `#1`, `#2`, ... while `taken` reports a clash
            pub fn unique(
                seed: &str,
                timestamp: DateTime<Utc>,
                taken: impl Fn(&Self) -> bool,
            ) -> Self {
                let mut id = Self::new(seed, timestamp);
                let mut attempt = 0;
                while taken(&id) {
                    attempt += 1;
                    id = Self::new(&format!("{}#{}", seed, attempt), timestamp);
                }
                id
            }

            /// Returns the hash portion of the ID
            pub fn hash(&self) -> &str {
                &self.hash
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(&format!("{}-{}", Self::PREFIX, self.hash))
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                let invalid = || IdError::Invalid {
                    kind: $kind,
                    prefix: $prefix,
                    len: $len,
                    value: s.to_string(),
                };

                let hash = s
                    .strip_prefix(Self::PREFIX)
                    .and_then(|rest| rest.strip_prefix('-'))
                    .ok_or_else(invalid)?;

                if hash.len() != Self::HASH_LEN || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
                    return Err(invalid());
                }

                Ok(Self {
                    hash: hash.to_ascii_lowercase(),
                })
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.to_string()
            }
        }
    };
}

prefixed_id!(
    /// Task ID in the format `t-{7-char-hash}`
    TaskId,
    kind = "task",
    prefix = "t",
    len = 7
);

prefixed_id!(
    /// Note ID in the format `n-{7-char-hash}`
    NoteId,
    kind = "note",
    prefix = "n",
    len = 7
);

prefixed_id!(
    /// Dependency edge ID in the format `d-{7-char-hash}`
    DependencyId,
    kind = "dependency",
    prefix = "d",
    len = 7
);

prefixed_id!(
    /// Activity entry ID in the format `e-{12-char-hash}`
    ///
    /// Longer than the other IDs since the log only grows.
    ActivityId,
    kind = "activity",
    prefix = "e",
    len = 12
);
