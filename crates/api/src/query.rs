//! Query parameter types for API handlers.

use serde::Deserialize;

/// Filters accepted by the record listing endpoints
/// (`?categoria=&tipo=&numero=`).
///
/// Values are raw strings so that an unknown category or class produces a
/// `VALIDATION_ERROR` body instead of an extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub categoria: Option<String>,
    pub tipo: Option<String>,
    /// Substring of the unit number. Leading zeros are ignored on both sides.
    pub numero: Option<String>,
}
