//! HTTP route handlers for the minutes server.

pub mod ata;
pub mod boards;
pub mod pipeline;

/// Health check endpoint.
pub async fn health() -> &'static str {
    "OK"
}

/// Treats `?param=` like an absent parameter.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
