//! Domain core for the focus task tracker.
//!
//! Pure types and rules with no database or HTTP dependencies, shared by the
//! repository layer (`focus-db`) and the API server (`focus-api`).

pub mod error;
pub mod hierarchy;
pub mod sanitize;
pub mod task_status;
pub mod time_tracking;
pub mod types;
pub mod validation;
