//! Integration tests for the record and history repositories.
//!
//! Exercises the repository layer against a real database to verify that:
//! - Records round-trip with their checklist columns intact
//! - Collections are isolated from each other
//! - The (collection, numero, cadence) key is unique
//! - History snapshots copy the committed row and survive deletes

use assert_matches::assert_matches;
use cabezal_core::checklist::Checklist;
use cabezal_core::collection::Collection;
use cabezal_core::equipment::EquipmentClass;
use cabezal_core::estado::Estado;
use cabezal_core::types::Date;
use cabezal_db::models::history::{OPERATION_CREATE, OPERATION_UPDATE};
use cabezal_db::models::record::RecordFields;
use cabezal_db::repositories::{HistoryRepo, RecordRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn d(y: i32, m: u32, day: u32) -> Date {
    Date::from_ymd_opt(y, m, day).unwrap()
}

fn fields(numero: &str, cadence: &str) -> RecordFields {
    let mut ops = Checklist::all_passed();
    ops.set(9, false);
    RecordFields {
        numero: numero.to_string(),
        tipo: Some(EquipmentClass::H8),
        linea: Some("3".to_string()),
        tipo_mantenimiento: cadence.to_string(),
        ubicacion: Some("Linea".to_string()),
        color: None,
        estado: Estado::Operational,
        fm: Some(d(2024, 1, 1)),
        sm: Some(d(2024, 1, 8)),
        ops,
        observaciones: "Alta".to_string(),
    }
}

async fn insert(pool: &PgPool, collection: Collection, f: &RecordFields) -> i64 {
    let mut tx = pool.begin().await.unwrap();
    let record = RecordRepo::create(&mut tx, collection, f).await.unwrap();
    HistoryRepo::append(&mut tx, &record, OPERATION_CREATE)
        .await
        .unwrap();
    tx.commit().await.unwrap();
    record.id
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_and_find_round_trips_fields(pool: PgPool) {
    let f = fields("101", "Semanal");
    let id = insert(&pool, Collection::Cabezales, &f).await;

    let found = RecordRepo::find_by_id(&pool, Collection::Cabezales, id)
        .await
        .unwrap()
        .expect("record should exist");

    assert_eq!(found.collection, Collection::Cabezales);
    assert_eq!(found.fields, f);
    assert!(found.fields.ops.get(8));
    assert!(!found.fields.ops.get(9));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn collections_are_isolated(pool: PgPool) {
    let id = insert(&pool, Collection::Cabezales, &fields("101", "Semanal")).await;

    let other = RecordRepo::find_by_id(&pool, Collection::Mantenimientos, id)
        .await
        .unwrap();
    assert!(other.is_none());

    let listed = RecordRepo::list(&pool, Collection::Mantenimientos).await.unwrap();
    assert!(listed.is_empty());

    // Same unit and cadence in the other collection is allowed.
    insert(&pool, Collection::Mantenimientos, &fields("101", "Semanal")).await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_numero_and_cadence_is_rejected(pool: PgPool) {
    insert(&pool, Collection::Cabezales, &fields("101", "Semanal")).await;
    insert(&pool, Collection::Cabezales, &fields("101", "Mensual")).await;

    let mut tx = pool.begin().await.unwrap();
    let err = RecordRepo::create(&mut tx, Collection::Cabezales, &fields("101", "Semanal"))
        .await
        .unwrap_err();

    assert_matches!(err, sqlx::Error::Database(ref db) => {
        assert_eq!(db.code().as_deref(), Some("23505"));
        assert_eq!(
            db.constraint(),
            Some("uq_maintenance_records_collection_numero_cadence")
        );
    });
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn sm_requires_operational_estado(pool: PgPool) {
    let mut f = fields("101", "Semanal");
    f.estado = Estado::NeedsRepair;

    let mut tx = pool.begin().await.unwrap();
    let err = RecordRepo::create(&mut tx, Collection::Cabezales, &f)
        .await
        .unwrap_err();
    assert_matches!(err, sqlx::Error::Database(_));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_overwrites_and_locks(pool: PgPool) {
    let id = insert(&pool, Collection::Cabezales, &fields("101", "Semanal")).await;

    let mut tx = pool.begin().await.unwrap();
    let current = RecordRepo::find_for_update(&mut tx, Collection::Cabezales, id)
        .await
        .unwrap()
        .expect("record should exist");

    let mut next = current.fields.clone();
    next.estado = Estado::Decommissioned;
    next.sm = None;
    next.observaciones = "Alta\nBAJA: motor failure - 2024-02-01".to_string();

    let updated = RecordRepo::update(&mut tx, Collection::Cabezales, id, &next)
        .await
        .unwrap()
        .expect("row should match");
    tx.commit().await.unwrap();

    assert_eq!(updated.fields.estado, Estado::Decommissioned);
    assert_eq!(updated.fields.sm, None);
    assert!(updated.updated_at >= current.updated_at);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_missing_returns_none(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let result = RecordRepo::update(&mut tx, Collection::Cabezales, 999_999, &fields("1", "Semanal"))
        .await
        .unwrap();
    assert!(result.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_is_scoped_to_collection(pool: PgPool) {
    let id = insert(&pool, Collection::Cabezales, &fields("101", "Semanal")).await;

    assert!(!RecordRepo::delete(&pool, Collection::Mantenimientos, id).await.unwrap());
    assert!(RecordRepo::delete(&pool, Collection::Cabezales, id).await.unwrap());
    assert!(!RecordRepo::delete(&pool, Collection::Cabezales, id).await.unwrap());
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn history_copies_row_and_survives_delete(pool: PgPool) {
    let id = insert(&pool, Collection::Cabezales, &fields("0042", "Semanal")).await;

    let mut tx = pool.begin().await.unwrap();
    let mut next = fields("0042", "Semanal");
    next.observaciones = "Alta\nMANTENIMIENTO - 2024-01-08".to_string();
    let updated = RecordRepo::update(&mut tx, Collection::Cabezales, id, &next)
        .await
        .unwrap()
        .unwrap();
    let snapshot = HistoryRepo::append(&mut tx, &updated, OPERATION_UPDATE)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    assert_eq!(snapshot.record_id, id);
    assert_eq!(snapshot.fields, updated.fields);

    RecordRepo::delete(&pool, Collection::Cabezales, id).await.unwrap();

    let history = HistoryRepo::list_by_numero(&pool, Collection::Cabezales, "0042")
        .await
        .unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].operation, OPERATION_UPDATE);
    assert_eq!(history[1].operation, OPERATION_CREATE);

    let other = HistoryRepo::list_by_numero(&pool, Collection::Mantenimientos, "0042")
        .await
        .unwrap();
    assert!(other.is_empty());
}
