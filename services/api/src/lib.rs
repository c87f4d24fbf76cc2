//! services/api/src/lib.rs
//!
//! The StudySpark HTTP service: storage and AI adapters, configuration, error
//! types and the axum router. The binaries in `src/bin` only wire these together.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
