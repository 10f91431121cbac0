//! Route definitions for the checklist catalogue.

use axum::routing::get;
use axum::Router;

use crate::handlers::checklists;
use crate::state::AppState;

/// Routes mounted at `/checklists`.
///
/// ```text
/// GET /                                  -> catalogue
/// GET /{tipo}/{tipo_mantenimiento}       -> items
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(checklists::catalogue))
        .route("/{tipo}/{tipo_mantenimiento}", get(checklists::items))
}
