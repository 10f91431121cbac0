use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// A transition would leave the record under repair or decommissioned
    /// without any explanatory note.
    #[error("Observations required: {0}")]
    ObservationsRequired(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
