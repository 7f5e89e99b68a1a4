//! Core data model types for announcement records.

pub mod announcement;
