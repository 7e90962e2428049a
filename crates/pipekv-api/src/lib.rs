//! pipekv-api: HTTP API layer
//!
//! This crate exposes the bulk operation handlers and the benchmark harness
//! behind HTTP REST endpoints via Axum.

pub mod http;
