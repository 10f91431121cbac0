//! Record collections served by the API.
//!
//! The two maintenance registers (equipment heads and the maintenance
//! log) share one schema and one set of transitions. They differ only in
//! configuration: the due-soon threshold and the labels shown for `estado`.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const COLLECTION_CABEZALES: &str = "cabezales";
pub const COLLECTION_MANTENIMIENTOS: &str = "mantenimientos";

/// All valid collection names.
pub const VALID_COLLECTIONS: &[&str] = &[COLLECTION_CABEZALES, COLLECTION_MANTENIMIENTOS];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Cabezales,
    Mantenimientos,
}

impl Collection {
    /// Return the database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cabezales => COLLECTION_CABEZALES,
            Self::Mantenimientos => COLLECTION_MANTENIMIENTOS,
        }
    }

    /// Parse from the database string representation.
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            COLLECTION_CABEZALES => Ok(Self::Cabezales),
            COLLECTION_MANTENIMIENTOS => Ok(Self::Mantenimientos),
            other => Err(CoreError::Validation(format!(
                "Unknown collection '{other}'. Valid collections: {}",
                VALID_COLLECTIONS.join(", ")
            ))),
        }
    }

    /// Days ahead of `sm` at which a record counts as due soon, unless
    /// overridden by configuration.
    pub fn default_due_soon_days(&self) -> i64 {
        match self {
            Self::Cabezales => 14,
            Self::Mantenimientos => 7,
        }
    }
}
