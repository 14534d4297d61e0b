//! Cross-cutting request middleware.

pub mod rate_limit;
pub mod security_headers;
