//! Domain logic for equipment-head maintenance tracking.
//!
//! This crate has no database or HTTP dependencies. Everything that needs
//! "now" takes the current date as an argument.

pub mod cadence;
pub mod category;
pub mod checklist;
pub mod collection;
pub mod equipment;
pub mod error;
pub mod estado;
pub mod transition;
pub mod types;
