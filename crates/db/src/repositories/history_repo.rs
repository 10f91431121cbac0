//! Repository for the append-only `maintenance_history` table.

use cabezal_core::collection::Collection;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::history::HistoryRecord;
use crate::models::record::MaintenanceRecord;
use crate::repositories::record_repo::FIELD_COLUMNS;

const COLUMNS: &str = "\
    id, record_id, operation, collection, \
    numero, tipo, linea, tipo_mantenimiento, ubicacion, color, estado, fm, sm, \
    op0, op1, op2, op3, op4, op5, op6, op7, op8, op9, op10, op11, observaciones, \
    recorded_at";

/// Provides insert and lookup for history snapshots. There is no update or
/// delete.
pub struct HistoryRepo;

impl HistoryRepo {
    /// Snapshot the stored state of `record` under `operation`.
    ///
    /// Copies from the live row inside the caller's transaction, so the
    /// snapshot matches exactly what was committed.
    pub async fn append(
        tx: &mut Transaction<'_, Postgres>,
        record: &MaintenanceRecord,
        operation: &str,
    ) -> Result<HistoryRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO maintenance_history (record_id, operation, collection, {FIELD_COLUMNS}) \
             SELECT id, $2, collection, {FIELD_COLUMNS} \
             FROM maintenance_records WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, HistoryRecord>(&query)
            .bind(record.id)
            .bind(operation)
            .fetch_one(&mut **tx)
            .await
    }

    /// All snapshots for a unit number in a collection, newest first.
    ///
    /// Keyed by `numero` rather than record id so that one unit's records
    /// for different cadences, and deleted records, are included.
    pub async fn list_by_numero(
        pool: &PgPool,
        collection: Collection,
        numero: &str,
    ) -> Result<Vec<HistoryRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM maintenance_history \
             WHERE collection = $1 AND numero = $2 \
             ORDER BY recorded_at DESC, id DESC"
        );
        sqlx::query_as::<_, HistoryRecord>(&query)
            .bind(collection.as_str())
            .bind(numero)
            .fetch_all(pool)
            .await
    }
}
