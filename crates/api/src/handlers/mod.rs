pub mod checklists;
pub mod records;
