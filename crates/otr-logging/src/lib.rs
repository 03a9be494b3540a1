//! ---
//! otr_section: "03-logging"
//! otr_subsection: "module"
//! otr_type: "source"
//! otr_scope: "code"
//! otr_description: "Structured logging adapters for bundle lifecycle diagnostics."
//! otr_version: "v0.0.0-prealpha"
//! otr_owner: "tbd"
//! ---
#![warn(missing_docs)]
//! Bundle-aware logging helpers used by the runtime crates.

use tracing::Level;
use tracing_subscriber::{fmt as subscriber_fmt, prelude::*, EnvFilter, Registry};

/// `otr_info!` and friends, exported at the crate root.
pub mod macros;

#[doc(hidden)]
pub use tracing;

/// Initialize a baseline tracing subscriber suitable for tests.
pub fn init() {
    let _ = Registry::default()
        .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(subscriber_fmt::layer().with_test_writer())
        .try_init();
}

/// Structured logging context propagated by the convenience macros.
#[derive(Debug, Default, Clone)]
pub struct LogContext<'a> {
    /// Symbolic name of the bundle the log event concerns.
    pub bundle: Option<&'a str>,
    /// Identifier of the bundle the log event concerns.
    pub bundle_id: Option<u64>,
    /// Lifecycle event kind being processed, if any.
    pub event: Option<&'a str>,
}

impl<'a> LogContext<'a> {
    /// Create an empty logging context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a bundle symbolic name and identifier.
    pub fn with_bundle(mut self, name: &'a str, id: u64) -> Self {
        self.bundle = Some(name);
        self.bundle_id = Some(id);
        self
    }

    /// Attach a lifecycle event kind.
    pub fn with_event(mut self, event: &'a str) -> Self {
        self.event = Some(event);
        self
    }
}

/// High-level outcome used when emitting lifecycle log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleOutcome {
    /// The operation completed successfully.
    Success,
    /// The operation failed and the failure was absorbed.
    Fault,
}

impl LifecycleOutcome {
    fn as_str(&self) -> &'static str {
        match self {
            LifecycleOutcome::Success => "success",
            LifecycleOutcome::Fault => "fault",
        }
    }
}

/// Emit a standardized lifecycle event with a success/fault outcome.
pub fn log_lifecycle_event(
    context: Option<&LogContext>,
    event: &str,
    message: &str,
    outcome: LifecycleOutcome,
) {
    let ctx = context.cloned().unwrap_or_default();
    match outcome {
        LifecycleOutcome::Success => tracing::event!(
            Level::INFO,
            event,
            outcome = outcome.as_str(),
            bundle = ctx.bundle.unwrap_or(""),
            bundle_id = ctx.bundle_id.unwrap_or_default(),
            message = %message
        ),
        LifecycleOutcome::Fault => tracing::event!(
            Level::ERROR,
            event,
            outcome = outcome.as_str(),
            bundle = ctx.bundle.unwrap_or(""),
            bundle_id = ctx.bundle_id.unwrap_or_default(),
            message = %message
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macros_emit_without_panic() {
        init();
        let ctx = LogContext::new().with_bundle("svc-a", 1);
        otr_info!(context = ctx.clone(), "bundle online");
        otr_debug!("debug message");
        otr_warn!(context = ctx.clone().with_event("STOPPED"), "stop hook slow");
        otr_error!(context = ctx, "stop failed: {}", 42);
    }

    #[test]
    fn lifecycle_helper_emits() {
        init();
        let ctx = LogContext::new().with_bundle("svc-a", 7);
        log_lifecycle_event(
            Some(&ctx),
            "bundle.deploy",
            "bundle deployed",
            LifecycleOutcome::Success,
        );
        log_lifecycle_event(
            None,
            "bundle.teardown",
            "stop hook failed",
            LifecycleOutcome::Fault,
        );
    }
}
