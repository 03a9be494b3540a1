//! ---
//! otr_section: "04-lifecycle-orchestration"
//! otr_subsection: "module"
//! otr_type: "source"
//! otr_scope: "code"
//! otr_description: "Bundle lifecycle simulation and deploy orchestration."
//! otr_version: "v0.0.0-prealpha"
//! otr_owner: "tbd"
//! ---
use otr_content::ContentError;
use thiserror::Error;

use crate::bundle::BundleState;

/// Result alias for runtime operations.
pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Activator hook that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ActivatorPhase {
    Start,
    Stop,
}

/// Errors raised while driving simulated bundles.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// `start` was reached without an activator attached to the builder.
    #[error("activator has not been provided for bundle {bundle}; attach one with with_activator")]
    MissingActivator { bundle: String },
    /// The lifecycle state machine refused a transition.
    #[error("bundle {bundle} cannot move from {from} to {to}")]
    InvalidTransition {
        bundle: String,
        from: BundleState,
        to: BundleState,
    },
    /// An activator hook returned an error.
    #[error("activator {phase} failed for bundle {bundle}")]
    ActivatorFailed {
        bundle: String,
        phase: ActivatorPhase,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
    /// Harness configuration could not provide a required value.
    #[error("harness configuration unusable: {0}")]
    Configuration(String),
    #[error(transparent)]
    Content(#[from] ContentError),
}

impl RuntimeError {
    pub(crate) fn activator(bundle: &str, phase: ActivatorPhase, err: anyhow::Error) -> Self {
        RuntimeError::ActivatorFailed {
            bundle: bundle.to_owned(),
            phase,
            source: err.into(),
        }
    }

    /// Whether this error wraps a content or metadata failure.
    pub fn is_content(&self) -> bool {
        matches!(self, RuntimeError::Content(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activator_failure_keeps_cause() {
        let err = RuntimeError::activator("svc-a", ActivatorPhase::Stop, anyhow::anyhow!("boom"));
        assert_eq!(err.to_string(), "activator stop failed for bundle svc-a");
        let source = std::error::Error::source(&err).expect("cause kept");
        assert_eq!(source.to_string(), "boom");
    }

    #[test]
    fn transition_error_names_states() {
        let err = RuntimeError::InvalidTransition {
            bundle: "svc-a".into(),
            from: BundleState::Stopped,
            to: BundleState::Started,
        };
        assert_eq!(err.to_string(), "bundle svc-a cannot move from STOPPED to STARTED");
    }
}
