//! Maintenance record entity model and DTOs.
//!
//! Checklist answers are stored as twelve boolean columns (`op0`..`op11`)
//! and exposed as a single [`Checklist`] on the model, so rows are decoded
//! with a hand-written `FromRow` rather than the derive.

use cabezal_core::checklist::{Checklist, SLOT_COUNT, SLOT_KEYS};
use cabezal_core::collection::Collection;
use cabezal_core::equipment::{ubicacion_for_linea, EquipmentClass};
use cabezal_core::error::CoreError;
use cabezal_core::estado::Estado;
use cabezal_core::transition::{MaintenanceState, Transition, WriteRequest};
use cabezal_core::types::{Date, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use validator::{Validate, ValidationError};

// ---------------------------------------------------------------------------
// Shared record fields
// ---------------------------------------------------------------------------

/// Fields shared by live records and history rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordFields {
    pub numero: String,
    pub tipo: Option<EquipmentClass>,
    pub linea: Option<String>,
    pub tipo_mantenimiento: String,
    pub ubicacion: Option<String>,
    pub color: Option<String>,
    pub estado: Estado,
    pub fm: Option<Date>,
    pub sm: Option<Date>,
    pub ops: Checklist,
    pub observaciones: String,
}

impl RecordFields {
    /// The lifecycle subset consumed by the state machine.
    pub fn state(&self) -> MaintenanceState {
        MaintenanceState {
            estado: self.estado,
            tipo_mantenimiento: self.tipo_mantenimiento.clone(),
            fm: self.fm,
            sm: self.sm,
            ops: self.ops,
            observaciones: self.observaciones.clone(),
        }
    }

    /// Replace the lifecycle subset with the result of a transition.
    pub fn with_state(self, state: MaintenanceState) -> Self {
        Self {
            estado: state.estado,
            tipo_mantenimiento: state.tipo_mantenimiento,
            fm: state.fm,
            sm: state.sm,
            ops: state.ops,
            observaciones: state.observaciones,
            ..self
        }
    }
}

fn decode_err(err: CoreError) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(err))
}

/// Read the twelve checklist columns of a row.
fn read_checklist(row: &PgRow) -> Result<Checklist, sqlx::Error> {
    let mut slots = [false; SLOT_COUNT];
    for (slot, column) in slots.iter_mut().zip(SLOT_KEYS) {
        *slot = row.try_get(column)?;
    }
    Ok(Checklist::new(slots))
}

impl<'r> FromRow<'r, PgRow> for RecordFields {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let tipo: Option<String> = row.try_get("tipo")?;
        let estado: String = row.try_get("estado")?;
        Ok(Self {
            numero: row.try_get("numero")?,
            tipo: tipo
                .as_deref()
                .map(EquipmentClass::from_str_value)
                .transpose()
                .map_err(decode_err)?,
            linea: row.try_get("linea")?,
            tipo_mantenimiento: row.try_get("tipo_mantenimiento")?,
            ubicacion: row.try_get("ubicacion")?,
            color: row.try_get("color")?,
            estado: Estado::from_str_value(&estado).map_err(decode_err)?,
            fm: row.try_get("fm")?,
            sm: row.try_get("sm")?,
            ops: read_checklist(row)?,
            observaciones: row.try_get("observaciones")?,
        })
    }
}

/// Decode the `collection` column.
pub(crate) fn read_collection(row: &PgRow) -> Result<Collection, sqlx::Error> {
    let value: String = row.try_get("collection")?;
    Collection::from_str_value(&value).map_err(decode_err)
}

// ---------------------------------------------------------------------------
// Maintenance record entity
// ---------------------------------------------------------------------------

/// A row from the `maintenance_records` table.
#[derive(Debug, Clone, Serialize)]
pub struct MaintenanceRecord {
    pub id: DbId,
    pub collection: Collection,
    #[serde(flatten)]
    pub fields: RecordFields,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl<'r> FromRow<'r, PgRow> for MaintenanceRecord {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            collection: read_collection(row)?,
            fields: RecordFields::from_row(row)?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

// ---------------------------------------------------------------------------
// Create / update DTO
// ---------------------------------------------------------------------------

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Body of `POST /{collection}` and `PUT /{collection}/{id}`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RecordInput {
    #[validate(length(max = 50), custom(function = "not_blank"))]
    pub numero: String,
    pub tipo: Option<EquipmentClass>,
    #[validate(length(max = 50))]
    pub linea: Option<String>,
    #[validate(length(max = 50), custom(function = "not_blank"))]
    pub tipo_mantenimiento: String,
    #[validate(length(max = 50))]
    pub ubicacion: Option<String>,
    #[validate(length(max = 50))]
    pub color: Option<String>,
    pub estado: Option<Estado>,
    pub fm: Option<Date>,
    pub sm: Option<Date>,
    #[serde(default)]
    pub ops: Checklist,
    #[serde(default)]
    pub observaciones: String,
}

impl RecordInput {
    /// Field-level validation, run before any transition logic.
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate()
            .map_err(|e| CoreError::Validation(e.to_string()))
    }

    pub fn transition(&self) -> Transition {
        Transition::Write(WriteRequest {
            estado: self.estado,
            tipo_mantenimiento: self.tipo_mantenimiento.trim().to_string(),
            fm: self.fm,
            sm: self.sm,
            ops: self.ops,
            observaciones: self.observaciones.clone(),
        })
    }

    /// Build the stored fields from this input and the resolved lifecycle state.
    ///
    /// `ubicacion` defaults to the location implied by `linea`.
    pub fn into_fields(self, state: MaintenanceState) -> RecordFields {
        let ubicacion = self
            .ubicacion
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| ubicacion_for_linea(self.linea.as_deref()).to_string());
        RecordFields {
            numero: self.numero.trim().to_string(),
            tipo: self.tipo,
            linea: self.linea,
            tipo_mantenimiento: state.tipo_mantenimiento,
            ubicacion: Some(ubicacion),
            color: self.color,
            estado: state.estado,
            fm: state.fm,
            sm: state.sm,
            ops: state.ops,
            observaciones: state.observaciones,
        }
    }
}

// ---------------------------------------------------------------------------
// Action DTOs
// ---------------------------------------------------------------------------

/// Body of `POST /{collection}/{id}/baja`.
#[derive(Debug, Clone, Deserialize)]
pub struct DecommissionInput {
    #[serde(default)]
    pub motivo: String,
}

impl DecommissionInput {
    pub fn transition(self) -> Transition {
        Transition::Decommission {
            motivo: self.motivo,
        }
    }
}

/// Body of `POST /{collection}/{id}/reactivar`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReactivateInput {
    #[serde(default)]
    pub ops: Checklist,
    #[serde(default)]
    pub observaciones: String,
    pub fecha_reactivacion: Option<Date>,
    pub tipo_mantenimiento: Option<String>,
}

impl ReactivateInput {
    pub fn transition(self) -> Transition {
        Transition::Reactivate {
            ops: self.ops,
            observaciones: self.observaciones,
            fecha_reactivacion: self.fecha_reactivacion,
            tipo_mantenimiento: non_blank(self.tipo_mantenimiento),
        }
    }
}

/// Body of `POST /{collection}/{id}/mantenimiento`.
#[derive(Debug, Clone, Deserialize)]
pub struct MaintenanceInput {
    #[serde(default)]
    pub ops: Checklist,
    #[serde(default)]
    pub observaciones: String,
    pub fecha_mantenimiento: Option<Date>,
    pub fecha_proximo: Option<Date>,
    pub tipo_mantenimiento: Option<String>,
    /// Optional relocation recorded together with the maintenance.
    pub ubicacion: Option<String>,
}

impl MaintenanceInput {
    pub fn transition(self) -> Transition {
        Transition::RegisterMaintenance {
            ops: self.ops,
            observaciones: self.observaciones,
            fecha_mantenimiento: self.fecha_mantenimiento,
            fecha_proximo: self.fecha_proximo,
            tipo_mantenimiento: non_blank(self.tipo_mantenimiento),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
