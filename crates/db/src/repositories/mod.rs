//! Repository layer.
//!
//! Each repository is a zero-sized struct. Reads accept `&PgPool`; writes
//! take the caller's transaction so a record change and its history row
//! commit together.

pub mod history_repo;
pub mod record_repo;

pub use history_repo::HistoryRepo;
pub use record_repo::RecordRepo;
