pub mod checklists;
pub mod health;
pub mod records;

use axum::Router;
use cabezal_core::collection::Collection;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /checklists                                  checklist catalogue
/// /checklists/{tipo}/{tipo_mantenimiento}      items for one pair
///
/// /cabezales/...                               record routes (see records::router)
/// /mantenimientos/...                          record routes (see records::router)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/checklists", checklists::router())
        .nest("/cabezales", records::router(Collection::Cabezales))
        .nest("/mantenimientos", records::router(Collection::Mantenimientos))
}
