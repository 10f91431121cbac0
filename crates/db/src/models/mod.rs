//! Domain model structs and DTOs.
//!
//! - `record`: the live `maintenance_records` row, its shared field set,
//!   and the request DTOs for create/update and the lifecycle actions
//! - `history`: append-only snapshots in `maintenance_history`

pub mod history;
pub mod record;
