//! ---
//! otr_section: "03-service-registry"
//! otr_subsection: "module"
//! otr_type: "source"
//! otr_scope: "code"
//! otr_description: "Service registration identity, lookup, and removal."
//! otr_version: "v0.0.0-prealpha"
//! otr_owner: "tbd"
//! ---
#![warn(missing_docs)]
//! In-memory service registry.
//!
//! Registrations are keyed by an opaque [`RegistrationId`]. Two registrations
//! of the very same instance are still two registrations, and removing one
//! never touches the other. Lookup matches on the advertised interface type
//! only; property bags are carried along but never queried.

pub mod properties;
pub mod reference;
pub mod registry;

pub use properties::{ServiceProperties, OBJECT_CLASS};
pub use reference::{RegistrationId, ServiceInterface, ServiceReference};
pub use registry::{ServiceRegistration, ServiceRegistry};
