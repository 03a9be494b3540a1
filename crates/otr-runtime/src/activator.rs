//! ---
//! otr_section: "04-lifecycle-orchestration"
//! otr_subsection: "module"
//! otr_type: "source"
//! otr_scope: "code"
//! otr_description: "Bundle lifecycle simulation and deploy orchestration."
//! otr_version: "v0.0.0-prealpha"
//! otr_owner: "tbd"
//! ---
use crate::context::BundleContext;

/// Start and stop hooks of a deployed bundle.
pub trait BundleActivator: Send {
    fn start(&mut self, context: &BundleContext) -> anyhow::Result<()>;

    fn stop(&mut self, context: &BundleContext) -> anyhow::Result<()>;
}

impl<A: BundleActivator + ?Sized> BundleActivator for Box<A> {
    fn start(&mut self, context: &BundleContext) -> anyhow::Result<()> {
        (**self).start(context)
    }

    fn stop(&mut self, context: &BundleContext) -> anyhow::Result<()> {
        (**self).stop(context)
    }
}
