//! Handlers for the `/cabezales` and `/mantenimientos` record collections.
//!
//! Every write runs in one transaction: the addressed row is locked, the
//! core state machine computes the next state, the row is rewritten and a
//! history snapshot is appended before commit.

use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use cabezal_core::category::{days_remaining, Category, Derived, ListingKey};
use cabezal_core::collection::Collection;
use cabezal_core::equipment::EquipmentClass;
use cabezal_core::error::CoreError;
use cabezal_core::transition::{self, Transition};
use cabezal_core::types::{today, Date, DbId};
use cabezal_db::models::history::{OPERATION_CREATE, OPERATION_UPDATE};
use cabezal_db::models::record::{
    DecommissionInput, MaintenanceInput, MaintenanceRecord, ReactivateInput,
    RecordInput,
};
use cabezal_db::repositories::{HistoryRepo, RecordRepo};
use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::query::ListParams;
use crate::response::DataResponse;
use crate::state::AppState;

const ENTITY: &str = "Maintenance record";

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: ENTITY, id })
}

// ---------------------------------------------------------------------------
// Response shapes
// ---------------------------------------------------------------------------

/// A record with its read-time derived fields.
#[derive(Debug, Serialize)]
pub struct RecordView {
    #[serde(flatten)]
    pub record: MaintenanceRecord,
    /// Display label of `estado` for this collection.
    pub estado_label: &'static str,
    pub categoria: Category,
    /// Listing rank, 1 (most urgent) to 4 (decommissioned).
    pub prioridad: u8,
    pub dias_restantes: Option<i64>,
    #[serde(skip)]
    key: ListingKey,
}

impl RecordView {
    fn new(record: MaintenanceRecord, today: Date, threshold_days: i64) -> Self {
        let fields = &record.fields;
        let derived = Derived::compute(record.id, fields.estado, fields.sm, today, threshold_days);
        Self {
            estado_label: fields.estado.label(record.collection),
            categoria: derived.category,
            prioridad: derived.key.rank,
            dias_restantes: fields.sm.map(|sm| days_remaining(sm, today)),
            key: derived.key,
            record,
        }
    }
}

/// Records sharing one unit number.
#[derive(Debug, Serialize)]
pub struct RecordGroup {
    pub numero: String,
    pub registros: Vec<RecordView>,
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub total: usize,
    pub por_categoria: BTreeMap<&'static str, usize>,
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// Parsed form of [`ListParams`].
struct Filter {
    categoria: Option<Category>,
    tipo: Option<EquipmentClass>,
    numero: Option<String>,
}

impl Filter {
    fn parse(params: &ListParams) -> Result<Self, CoreError> {
        let non_empty = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        Ok(Self {
            categoria: non_empty(&params.categoria)
                .map(|c| Category::from_str_value(&c))
                .transpose()?,
            tipo: non_empty(&params.tipo)
                .map(|t| EquipmentClass::from_str_value(&t))
                .transpose()?,
            numero: non_empty(&params.numero).map(|n| without_leading_zeros(&n).to_string()),
        })
    }

    fn matches(&self, view: &RecordView) -> bool {
        let fields = &view.record.fields;
        self.categoria.map_or(true, |c| c == view.categoria)
            && self.tipo.map_or(true, |t| fields.tipo == Some(t))
            && self
                .numero
                .as_deref()
                .map_or(true, |n| without_leading_zeros(&fields.numero).contains(n))
    }
}

fn without_leading_zeros(numero: &str) -> &str {
    let trimmed = numero.trim();
    match trimmed.trim_start_matches('0') {
        "" if !trimmed.is_empty() => "0",
        rest => rest,
    }
}

/// Load a collection with derived fields, filtered and in listing order.
async fn load_views(
    state: &AppState,
    collection: Collection,
    filter: &Filter,
) -> AppResult<Vec<RecordView>> {
    let today = today();
    let threshold = state.config.due_soon_days(collection);
    let mut views: Vec<RecordView> = RecordRepo::list(&state.pool, collection)
        .await?
        .into_iter()
        .map(|record| RecordView::new(record, today, threshold))
        .filter(|view| filter.matches(view))
        .collect();
    views.sort_by_key(|view| view.key);
    Ok(views)
}

/// GET /api/v1/{collection}
pub async fn list(
    Extension(collection): Extension<Collection>,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<impl IntoResponse> {
    let filter = Filter::parse(&params)?;
    let views = load_views(&state, collection, &filter).await?;
    Ok(Json(DataResponse { data: views }))
}

/// GET /api/v1/{collection}/grouped
///
/// Groups follow the position of their most urgent record.
pub async fn grouped(
    Extension(collection): Extension<Collection>,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<impl IntoResponse> {
    let filter = Filter::parse(&params)?;
    let views = load_views(&state, collection, &filter).await?;

    let mut groups: IndexMap<String, Vec<RecordView>> = IndexMap::new();
    for view in views {
        groups
            .entry(view.record.fields.numero.clone())
            .or_default()
            .push(view);
    }
    let data: Vec<RecordGroup> = groups
        .into_iter()
        .map(|(numero, registros)| RecordGroup { numero, registros })
        .collect();
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/{collection}/summary
pub async fn summary(
    Extension(collection): Extension<Collection>,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let filter = Filter::parse(&ListParams::default())?;
    let views = load_views(&state, collection, &filter).await?;

    let mut por_categoria: BTreeMap<&'static str, usize> =
        Category::ALL.iter().map(|c| (c.as_str(), 0)).collect();
    for view in &views {
        *por_categoria.entry(view.categoria.as_str()).or_default() += 1;
    }
    Ok(Json(DataResponse {
        data: Summary {
            total: views.len(),
            por_categoria,
        },
    }))
}

/// GET /api/v1/{collection}/{id}
pub async fn get_by_id(
    Extension(collection): Extension<Collection>,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let record = RecordRepo::find_by_id(&state.pool, collection, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse {
        data: view(&state, record),
    }))
}

/// GET /api/v1/{collection}/history/{numero}
pub async fn history(
    Extension(collection): Extension<Collection>,
    State(state): State<AppState>,
    Path(numero): Path<String>,
) -> AppResult<impl IntoResponse> {
    let entries = HistoryRepo::list_by_numero(&state.pool, collection, numero.trim()).await?;
    Ok(Json(DataResponse { data: entries }))
}

fn view(state: &AppState, record: MaintenanceRecord) -> RecordView {
    let threshold = state.config.due_soon_days(record.collection);
    RecordView::new(record, today(), threshold)
}

// ---------------------------------------------------------------------------
// Create / update / delete
// ---------------------------------------------------------------------------

/// POST /api/v1/{collection}
pub async fn create(
    Extension(collection): Extension<Collection>,
    State(state): State<AppState>,
    AppJson(input): AppJson<RecordInput>,
) -> AppResult<impl IntoResponse> {
    input.check()?;
    let next = transition::apply(None, input.transition(), today())?;
    let fields = input.into_fields(next);

    let mut tx = state.pool.begin().await?;
    let record = RecordRepo::create(&mut tx, collection, &fields).await?;
    HistoryRepo::append(&mut tx, &record, OPERATION_CREATE).await?;
    tx.commit().await?;

    tracing::info!(
        id = record.id,
        collection = collection.as_str(),
        numero = %record.fields.numero,
        estado = record.fields.estado.as_str(),
        "Maintenance record created"
    );
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: view(&state, record),
        }),
    ))
}

/// PUT /api/v1/{collection}/{id}
pub async fn update(
    Extension(collection): Extension<Collection>,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<RecordInput>,
) -> AppResult<impl IntoResponse> {
    input.check()?;

    let mut tx = state.pool.begin().await?;
    let current = RecordRepo::find_for_update(&mut tx, collection, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let next = transition::apply(Some(&current.fields.state()), input.transition(), today())?;
    let fields = input.into_fields(next);

    let record = RecordRepo::update(&mut tx, collection, id, &fields)
        .await?
        .ok_or_else(|| not_found(id))?;
    HistoryRepo::append(&mut tx, &record, OPERATION_UPDATE).await?;
    tx.commit().await?;

    tracing::info!(
        id,
        collection = collection.as_str(),
        estado = record.fields.estado.as_str(),
        "Maintenance record updated"
    );
    Ok(Json(DataResponse {
        data: view(&state, record),
    }))
}

/// DELETE /api/v1/{collection}/{id}
///
/// History rows for the record are kept.
pub async fn delete(
    Extension(collection): Extension<Collection>,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if RecordRepo::delete(&state.pool, collection, id).await? {
        tracing::info!(id, collection = collection.as_str(), "Maintenance record deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

// ---------------------------------------------------------------------------
// Lifecycle actions
// ---------------------------------------------------------------------------

/// Run one lifecycle transition against a locked record.
async fn transition_record(
    state: &AppState,
    collection: Collection,
    id: DbId,
    transition: Transition,
    ubicacion: Option<String>,
) -> AppResult<MaintenanceRecord> {
    let operation = transition.name();

    let mut tx = state.pool.begin().await?;
    let current = RecordRepo::find_for_update(&mut tx, collection, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let next = transition::apply(Some(&current.fields.state()), transition, today())?;

    let mut fields = current.fields.with_state(next);
    if let Some(ubicacion) = ubicacion.filter(|u| !u.trim().is_empty()) {
        fields.ubicacion = Some(ubicacion);
    }

    let record = RecordRepo::update(&mut tx, collection, id, &fields)
        .await?
        .ok_or_else(|| not_found(id))?;
    HistoryRepo::append(&mut tx, &record, operation).await?;
    tx.commit().await?;

    tracing::info!(
        id,
        collection = collection.as_str(),
        operation,
        estado = record.fields.estado.as_str(),
        sm = ?record.fields.sm,
        "Maintenance record transition committed"
    );
    Ok(record)
}

/// POST /api/v1/{collection}/{id}/baja
pub async fn decommission(
    Extension(collection): Extension<Collection>,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<DecommissionInput>,
) -> AppResult<impl IntoResponse> {
    let record = transition_record(&state, collection, id, input.transition(), None).await?;
    Ok(Json(DataResponse {
        data: view(&state, record),
    }))
}

/// POST /api/v1/{collection}/{id}/reactivar
pub async fn reactivate(
    Extension(collection): Extension<Collection>,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<ReactivateInput>,
) -> AppResult<impl IntoResponse> {
    let record = transition_record(&state, collection, id, input.transition(), None).await?;
    Ok(Json(DataResponse {
        data: view(&state, record),
    }))
}

/// POST /api/v1/{collection}/{id}/mantenimiento
pub async fn register_maintenance(
    Extension(collection): Extension<Collection>,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    AppJson(mut input): AppJson<MaintenanceInput>,
) -> AppResult<impl IntoResponse> {
    let ubicacion = input.ubicacion.take();
    let record = transition_record(&state, collection, id, input.transition(), ubicacion).await?;
    Ok(Json(DataResponse {
        data: view(&state, record),
    }))
}

/// POST /api/v1/{collection}/{id}/reparar
pub async fn mark_repaired(
    Extension(collection): Extension<Collection>,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let record = transition_record(&state, collection, id, Transition::MarkRepaired, None).await?;
    Ok(Json(DataResponse {
        data: view(&state, record),
    }))
}
