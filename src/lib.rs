//! Defect Cost Engine library crate.
//!
//! This crate estimates what a software defect costs depending on the
//! lifecycle phase it is caught in.  Callers may depend on the
//! `defect_cost_engine` crate and call `engine::compute_cost` directly,
//! assemble submissions with `simulator::DefectDraft`, or embed the
//! HTTP API via `api::build_router`.

pub mod models;
pub mod error;
pub mod rates;
pub mod engine;
pub mod config;
pub mod simulator;
pub mod samples;
pub mod store;
pub mod dashboard;
pub mod api;

pub use engine::{compute_cost, compute_cost_with, PhaseProjection};
pub use error::{CostError, Result};
pub use models::*;
pub use simulator::DefectDraft;
pub use store::{FileStore, KeyValueStore, MemoryStore, Repository};
