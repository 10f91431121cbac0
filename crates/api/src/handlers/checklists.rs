//! Handlers for the checklist catalogue.

use std::collections::BTreeMap;

use axum::extract::Path;
use axum::response::IntoResponse;
use axum::Json;
use cabezal_core::checklist::{self, ChecklistItem};
use cabezal_core::equipment::EquipmentClass;
use serde::Serialize;

use crate::error::AppResult;
use crate::response::DataResponse;

#[derive(Debug, Serialize)]
pub struct Catalogue {
    /// Items per class, then per allowed cadence.
    pub por_tipo: BTreeMap<&'static str, BTreeMap<&'static str, Vec<ChecklistItem>>>,
    /// Items for records without an equipment class.
    pub generico: Vec<ChecklistItem>,
}

#[derive(Debug, Serialize)]
pub struct ChecklistItems {
    pub tipo: EquipmentClass,
    pub tipo_mantenimiento: String,
    pub items: Vec<ChecklistItem>,
}

/// GET /api/v1/checklists
pub async fn catalogue() -> impl IntoResponse {
    Json(DataResponse {
        data: Catalogue {
            por_tipo: checklist::catalogue(),
            generico: checklist::items_for(None, ""),
        },
    })
}

/// GET /api/v1/checklists/{tipo}/{tipo_mantenimiento}
pub async fn items(
    Path((tipo, tipo_mantenimiento)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
    let tipo = EquipmentClass::from_str_value(&tipo)?;
    tipo.validate_cadence(&tipo_mantenimiento)?;
    let items = checklist::items_for(Some(tipo), &tipo_mantenimiento);
    Ok(Json(DataResponse {
        data: ChecklistItems {
            tipo,
            tipo_mantenimiento,
            items,
        },
    }))
}
