//! Route definitions for a maintenance record collection.

use axum::routing::{get, post};
use axum::{Extension, Router};
use cabezal_core::collection::Collection;

use crate::handlers::records;
use crate::state::AppState;

/// Routes mounted at `/cabezales` and `/mantenimientos`.
///
/// The collection is injected as an [`Extension`] so every handler is
/// shared between both mounts.
///
/// ```text
/// GET    /                        -> list
/// POST   /                        -> create
/// GET    /grouped                 -> grouped
/// GET    /summary                 -> summary
/// GET    /history/{numero}        -> history
/// GET    /{id}                    -> get_by_id
/// PUT    /{id}                    -> update
/// DELETE /{id}                    -> delete
/// POST   /{id}/baja               -> decommission
/// POST   /{id}/reactivar          -> reactivate
/// POST   /{id}/mantenimiento      -> register_maintenance
/// POST   /{id}/reparar            -> mark_repaired
/// ```
pub fn router(collection: Collection) -> Router<AppState> {
    Router::new()
        .route("/", get(records::list).post(records::create))
        .route("/grouped", get(records::grouped))
        .route("/summary", get(records::summary))
        .route("/history/{numero}", get(records::history))
        .route(
            "/{id}",
            get(records::get_by_id)
                .put(records::update)
                .delete(records::delete),
        )
        .route("/{id}/baja", post(records::decommission))
        .route("/{id}/reactivar", post(records::reactivate))
        .route("/{id}/mantenimiento", post(records::register_maintenance))
        .route("/{id}/reparar", post(records::mark_repaired))
        .layer(Extension(collection))
}
