//! Newtype domain identifiers.
//!
//! A [`SourceUrl`] is the identity key of a [`crate::Source`] and is what
//! deduplication compares. A [`ReportLocation`] is whatever the storage
//! provider says it wrote. Keeping them distinct from plain `String`s stops a
//! title or snippet from being used where an identity is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is blank.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.trim().is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id! {
    /// The URL of a discovered source. Unique within a run's ranked source list.
    SourceUrl
}

string_id! {
    /// Concrete location a report was written to, as returned by the
    /// [`crate::ReportStore`].
    ReportLocation
}

// ---------------------------------------------------------------------------
// Run identifier
// ---------------------------------------------------------------------------

/// Identifies one research run (one call to the workflow executor).
///
/// Generated fresh per run and attached to the run's tracing span so all
/// provider activity from a single query can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    /// Generates a new random run identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
