//! Per-request operations composed from the workspace clients.

pub mod ata;
pub mod boards;
