//! Repository for the `maintenance_records` table.

use cabezal_core::collection::Collection;
use cabezal_core::types::DbId;
use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::record::{MaintenanceRecord, RecordFields};

/// Record columns in `RecordFields` order, excluding keys and timestamps.
pub(crate) const FIELD_COLUMNS: &str = "\
    numero, tipo, linea, tipo_mantenimiento, ubicacion, color, estado, fm, sm, \
    op0, op1, op2, op3, op4, op5, op6, op7, op8, op9, op10, op11, observaciones";

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, collection, \
    numero, tipo, linea, tipo_mantenimiento, ubicacion, color, estado, fm, sm, \
    op0, op1, op2, op3, op4, op5, op6, op7, op8, op9, op10, op11, observaciones, \
    created_at, updated_at";

/// Bind every `RecordFields` value in `FIELD_COLUMNS` order.
fn bind_fields<'q, O>(
    query: QueryAs<'q, Postgres, O, PgArguments>,
    fields: &'q RecordFields,
) -> QueryAs<'q, Postgres, O, PgArguments> {
    let mut query = query
        .bind(&fields.numero)
        .bind(fields.tipo.map(|t| t.as_str()))
        .bind(&fields.linea)
        .bind(&fields.tipo_mantenimiento)
        .bind(&fields.ubicacion)
        .bind(&fields.color)
        .bind(fields.estado.as_str())
        .bind(fields.fm)
        .bind(fields.sm);
    for passed in fields.ops.slots() {
        query = query.bind(*passed);
    }
    query.bind(&fields.observaciones)
}

/// Provides CRUD operations for maintenance records.
pub struct RecordRepo;

impl RecordRepo {
    /// Insert a new record, returning the created row.
    ///
    /// Fails with a unique violation on
    /// `uq_maintenance_records_collection_numero_cadence` when the same
    /// unit already has a record for this cadence.
    pub async fn create(
        tx: &mut Transaction<'_, Postgres>,
        collection: Collection,
        fields: &RecordFields,
    ) -> Result<MaintenanceRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO maintenance_records (collection, {FIELD_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, \
                     $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21, $22, $23) \
             RETURNING {COLUMNS}"
        );
        let query = sqlx::query_as::<_, MaintenanceRecord>(&query).bind(collection.as_str());
        bind_fields(query, fields).fetch_one(&mut **tx).await
    }

    /// Find a record by id within a collection.
    pub async fn find_by_id(
        pool: &PgPool,
        collection: Collection,
        id: DbId,
    ) -> Result<Option<MaintenanceRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM maintenance_records WHERE id = $1 AND collection = $2"
        );
        sqlx::query_as::<_, MaintenanceRecord>(&query)
            .bind(id)
            .bind(collection.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Find a record and lock its row until the transaction ends.
    ///
    /// Concurrent transitions on the same record serialize here.
    pub async fn find_for_update(
        tx: &mut Transaction<'_, Postgres>,
        collection: Collection,
        id: DbId,
    ) -> Result<Option<MaintenanceRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM maintenance_records \
             WHERE id = $1 AND collection = $2 \
             FOR UPDATE"
        );
        sqlx::query_as::<_, MaintenanceRecord>(&query)
            .bind(id)
            .bind(collection.as_str())
            .fetch_optional(&mut **tx)
            .await
    }

    /// List every record in a collection by id. Listing order is applied
    /// by the caller since it depends on the current date.
    pub async fn list(
        pool: &PgPool,
        collection: Collection,
    ) -> Result<Vec<MaintenanceRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM maintenance_records WHERE collection = $1 ORDER BY id"
        );
        sqlx::query_as::<_, MaintenanceRecord>(&query)
            .bind(collection.as_str())
            .fetch_all(pool)
            .await
    }

    /// Overwrite all stored fields of a record. Returns `None` if no row
    /// matched.
    pub async fn update(
        tx: &mut Transaction<'_, Postgres>,
        collection: Collection,
        id: DbId,
        fields: &RecordFields,
    ) -> Result<Option<MaintenanceRecord>, sqlx::Error> {
        let query = format!(
            "UPDATE maintenance_records SET \
                numero = $3, tipo = $4, linea = $5, tipo_mantenimiento = $6, \
                ubicacion = $7, color = $8, estado = $9, fm = $10, sm = $11, \
                op0 = $12, op1 = $13, op2 = $14, op3 = $15, op4 = $16, op5 = $17, \
                op6 = $18, op7 = $19, op8 = $20, op9 = $21, op10 = $22, op11 = $23, \
                observaciones = $24, \
                updated_at = NOW() \
             WHERE id = $1 AND collection = $2 \
             RETURNING {COLUMNS}"
        );
        let query = sqlx::query_as::<_, MaintenanceRecord>(&query)
            .bind(id)
            .bind(collection.as_str());
        bind_fields(query, fields).fetch_optional(&mut **tx).await
    }

    /// Permanently delete a record. History rows are kept.
    /// Returns `true` if a row was removed.
    pub async fn delete(
        pool: &PgPool,
        collection: Collection,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM maintenance_records WHERE id = $1 AND collection = $2")
                .bind(id)
                .bind(collection.as_str())
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
