//! Maintenance history snapshots.

use cabezal_core::collection::Collection;
use cabezal_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};

use crate::models::record::{read_collection, RecordFields};

pub const OPERATION_CREATE: &str = "create";
pub const OPERATION_UPDATE: &str = "update";

/// A row from the `maintenance_history` table: a copy of the record as it
/// stood right after `operation` was committed.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryRecord {
    pub id: DbId,
    pub record_id: DbId,
    pub operation: String,
    pub collection: Collection,
    #[serde(flatten)]
    pub fields: RecordFields,
    pub recorded_at: Timestamp,
}

impl<'r> FromRow<'r, PgRow> for HistoryRecord {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            record_id: row.try_get("record_id")?,
            operation: row.try_get("operation")?,
            collection: read_collection(row)?,
            fields: RecordFields::from_row(row)?,
            recorded_at: row.try_get("recorded_at")?,
        })
    }
}
