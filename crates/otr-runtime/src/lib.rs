//! ---
//! otr_section: "04-lifecycle-orchestration"
//! otr_subsection: "module"
//! otr_type: "source"
//! otr_scope: "code"
//! otr_description: "Bundle lifecycle simulation and deploy orchestration."
//! otr_version: "v0.0.0-prealpha"
//! otr_owner: "tbd"
//! ---
//! In-memory bundle runtime for tests.
//!
//! [`TestRuntime`] creates simulated bundles, tells every live bundle about
//! lifecycle changes, and tears deployed bundles down in reverse order.
//! Everything runs synchronously on the calling thread; [`Hold`] is the one
//! primitive meant to block while code under test works on other threads.
//!
//! ```no_run
//! use otr_runtime::{BundleActivator, BundleContext, TestRuntime};
//!
//! struct Noop;
//!
//! impl BundleActivator for Noop {
//!     fn start(&mut self, _context: &BundleContext) -> anyhow::Result<()> {
//!         Ok(())
//!     }
//!
//!     fn stop(&mut self, _context: &BundleContext) -> anyhow::Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let runtime = TestRuntime::new();
//! runtime
//!     .deploy("svc-a")
//!     .with_activator(Noop)
//!     .using(["/META-INF/services/svc"])?;
//! runtime.shutdown();
//! # Ok(())
//! # }
//! ```

pub mod activator;
pub mod builder;
pub mod bundle;
pub mod context;
pub mod error;
pub mod events;
pub mod runtime;
pub mod table;
pub mod wait;

pub use activator::BundleActivator;
pub use builder::BundleBuilder;
pub use bundle::{Bundle, BundleState};
pub use context::BundleContext;
pub use error::{ActivatorPhase, Result, RuntimeError};
pub use events::{
    BundleEvent, BundleEventKind, BundleListener, EventRecorder, ListenerId, RecordedEvent,
};
pub use runtime::{hint_duration, TestRuntime};
pub use table::BundleTable;
pub use wait::{Hold, WaitError, WaitOutcome};
