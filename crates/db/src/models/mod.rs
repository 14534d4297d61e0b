//! Domain model structs and DTOs.
//!
//! Each entity submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` + `Validate` request DTOs that also implement
//!   [`Sanitize`](focus_core::sanitize::Sanitize) for their free-text fields

pub mod migration;
pub mod project;
pub mod statistics;
pub mod task;
pub mod time_entry;
