//! Gift recommendation engine and its collaborator boundaries.
//!
//! The crate is split between [`engine`], which owns the deterministic
//! recommendation pipeline (normalization, budget filter, explicit and
//! semantic matching, safety gate, categorization, explanations), and
//! [`clients`], which defines the outbound collaborator traits and their
//! HTTP implementations. Everything else is ambient plumbing: environment
//! configuration, tracing setup, and the application-level error type.

pub mod clients;
pub mod config;
pub mod engine;
pub mod error;
pub mod telemetry;
