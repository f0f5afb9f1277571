//! Record identifiers
//!
//! All IDs use the format: `{8-char-hex}-{kind}-{slug}`
//! Example: `9f3c01aa-task-morning-walk`
//!
//! The hex part comes from the random tail of a UUIDv7, so two records with
//! the same title created in the same millisecond still get distinct IDs.

use serde::{Deserialize, Serialize};

/// Generate an ID from a record kind and title
pub fn generate_id(kind: &str, title: &str) -> String {
    let uuid = uuid::Uuid::now_v7().simple().to_string();
    let hex = &uuid[uuid.len() - 8..];
    let slug = slugify(title);
    if slug.is_empty() {
        format!("{}-{}", hex, kind)
    } else {
        format!("{}-{}-{}", hex, kind, slug)
    }
}

/// Slugify a title for use in IDs
fn slugify(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        // Strip apostrophes entirely, replace other non-alphanumeric with hyphens
        .filter_map(|c| {
            if c.is_alphanumeric() {
                Some(c)
            } else if c == '\'' || c == '\u{2019}' || c == '\u{2018}' {
                None
            } else {
                Some('-')
            }
        })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a fresh ID whose slug is derived from `title`
            pub fn new(title: &str) -> Self {
                Self(generate_id($kind, title))
            }

            /// Get the full ID string
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Get the hex prefix
            pub fn hex_prefix(&self) -> &str {
                self.0.split('-').next().unwrap_or_default()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self(generate_id($kind, ""))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

record_id!(
    /// Handle of a pet inside its owner's pet list
    PetId,
    "pet"
);

record_id!(
    /// Handle of a task inside its pet's task list
    TaskId,
    "task"
);
