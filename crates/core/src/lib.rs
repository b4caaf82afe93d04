//! # OMMS Core
//!
//! Domain types shared across the OMMS backend: request/response DTOs,
//! the uniform `{code, message, data}` envelope, the error taxonomy, and
//! the temporal formatting helpers used at every handler boundary.
//!
//! This crate is deliberately free of any web-framework or database
//! dependency so the business rules it encodes (booking validation,
//! status machines, stock arithmetic) can be tested in isolation.

/// Domain error taxonomy mapped to HTTP statuses by the API crate
pub mod errors;
/// Request/response DTOs grouped by subsystem
pub mod models;
/// The uniform JSON envelope every endpoint returns
pub mod response;
/// Shared date/time parsing and formatting
pub mod time_fmt;
