//! ---
//! otr_section: "04-lifecycle-orchestration"
//! otr_subsection: "module"
//! otr_type: "source"
//! otr_scope: "code"
//! otr_description: "Bundle lifecycle simulation and deploy orchestration."
//! otr_version: "v0.0.0-prealpha"
//! otr_owner: "tbd"
//! ---
use std::fmt;
use std::sync::Arc;

use otr_common::BundleId;
use parking_lot::Mutex;
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};
use tracing::trace;

use crate::bundle::Bundle;

/// Kind of lifecycle transition carried by a [`BundleEvent`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum BundleEventKind {
    Installed,
    Started,
    Stopped,
    Uninstalled,
}

impl BundleEventKind {
    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// Lifecycle notification delivered to bundle listeners.
#[derive(Clone)]
pub struct BundleEvent {
    kind: BundleEventKind,
    bundle: Arc<Bundle>,
}

impl BundleEvent {
    pub(crate) fn new(kind: BundleEventKind, bundle: Arc<Bundle>) -> Self {
        Self { kind, bundle }
    }

    pub fn kind(&self) -> BundleEventKind {
        self.kind
    }

    /// Bundle whose state changed.
    pub fn bundle(&self) -> &Arc<Bundle> {
        &self.bundle
    }
}

impl fmt::Debug for BundleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BundleEvent")
            .field("kind", &self.kind)
            .field("bundle", &self.bundle.symbolic_name())
            .field("bundle_id", &self.bundle.id())
            .finish()
    }
}

/// Receiver of lifecycle events, registered on a bundle context.
pub trait BundleListener: Send + Sync {
    fn bundle_changed(&self, event: &BundleEvent);
}

impl<F> BundleListener for F
where
    F: Fn(&BundleEvent) + Send + Sync,
{
    fn bundle_changed(&self, event: &BundleEvent) {
        self(event)
    }
}

/// Token returned when a listener is added, used to remove it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

/// Deliver `kind` for `subject` to every bundle in `targets`, in order.
///
/// Each target's listener list is copied before delivery, so listeners may
/// add or remove listeners without deadlocking.
pub(crate) fn fan_out(targets: &[Arc<Bundle>], kind: BundleEventKind, subject: &Arc<Bundle>) {
    let event = BundleEvent::new(kind, subject.clone());
    for target in targets {
        trace!(event = %kind, subject = %subject.id(), target = %target.id(), "delivering bundle event");
        for listener in target.listener_snapshot() {
            listener.bundle_changed(&event);
        }
    }
}

/// Event as seen by an [`EventRecorder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    pub kind: BundleEventKind,
    pub bundle_id: BundleId,
    pub symbolic_name: String,
}

/// Listener that records every delivered event.
///
/// Only names and ids are kept so that a recorder attached to a bundle does
/// not keep that bundle alive.
#[derive(Debug, Default)]
pub struct EventRecorder {
    events: Mutex<Vec<RecordedEvent>>,
}

impl EventRecorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().clone()
    }

    /// Recorded kinds, in delivery order.
    pub fn kinds(&self) -> Vec<BundleEventKind> {
        self.events.lock().iter().map(|event| event.kind).collect()
    }

    /// Events concerning the named bundle.
    pub fn for_bundle(&self, symbolic_name: &str) -> Vec<RecordedEvent> {
        self.events
            .lock()
            .iter()
            .filter(|event| event.symbolic_name == symbolic_name)
            .cloned()
            .collect()
    }

    pub fn count(&self, kind: BundleEventKind) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|event| event.kind == kind)
            .count()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl BundleListener for EventRecorder {
    fn bundle_changed(&self, event: &BundleEvent) {
        self.events.lock().push(RecordedEvent {
            kind: event.kind(),
            bundle_id: event.bundle().id(),
            symbolic_name: event.bundle().symbolic_name().to_owned(),
        });
    }
}
