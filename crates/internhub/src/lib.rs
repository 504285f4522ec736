//! Client core for the internship placement platform.
//!
//! Derives the intern's active plans from purchase history, decides whether a job
//! application is allowed, and keeps an optimistic mirror of the credit ledger while the
//! REST backend stays authoritative.

pub mod backend;
pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
