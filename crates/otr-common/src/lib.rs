//! ---
//! otr_section: "01-core-functionality"
//! otr_subsection: "module"
//! otr_type: "source"
//! otr_scope: "code"
//! otr_description: "Shared primitives and utilities for the bundle test runtime."
//! otr_version: "v0.0.0-prealpha"
//! otr_owner: "tbd"
//! ---
//! Core shared primitives for the OTR workspace.
//! This crate exposes bundle identifiers, harness configuration loading and
//! tracing initialisation consumed across the workspace.

pub mod config;
pub mod ids;
pub mod logging;

pub use config::{HarnessConfig, LoggingConfig, WaitConfig};
pub use ids::BundleId;
pub use logging::{init_tracing, LogFormat};
