//! Protocol implementations used by the pipeline.
//!
//! Currently the registrar's HTTP availability API.

/// Registrar availability API client
pub mod registrar;

pub use registrar::{parse_availability_body, RegistrarClient};
