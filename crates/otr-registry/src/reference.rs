//! ---
//! otr_section: "03-service-registry"
//! otr_subsection: "module"
//! otr_type: "source"
//! otr_scope: "code"
//! otr_description: "Service registration identity, lookup, and removal."
//! otr_version: "v0.0.0-prealpha"
//! otr_owner: "tbd"
//! ---
use std::any::{type_name, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

use otr_common::BundleId;
use uuid::Uuid;

use crate::properties::ServiceProperties;

/// Opaque identity of one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegistrationId(Uuid);

impl RegistrationId {
    /// Fresh random identity.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RegistrationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Interface type a service is advertised under.
///
/// Equality is type identity; the name is kept for logging and the
/// `objectClass` property.
#[derive(Clone, Copy)]
pub struct ServiceInterface {
    type_id: TypeId,
    name: &'static str,
}

impl ServiceInterface {
    /// Interface descriptor for `I`, usually a `dyn Trait`.
    pub fn of<I: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<I>(),
            name: type_name::<I>(),
        }
    }

    /// `TypeId` of the interface.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Fully qualified type name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether this descriptor denotes `I`.
    pub fn is<I: ?Sized + 'static>(&self) -> bool {
        self.type_id == TypeId::of::<I>()
    }
}

impl PartialEq for ServiceInterface {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ServiceInterface {}

impl Hash for ServiceInterface {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for ServiceInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ServiceInterface").field(&self.name).finish()
    }
}

impl fmt::Display for ServiceInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Snapshot of a registration taken at lookup time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceReference {
    pub(crate) id: RegistrationId,
    pub(crate) interface: ServiceInterface,
    pub(crate) service_name: String,
    pub(crate) owner: BundleId,
    pub(crate) properties: ServiceProperties,
}

impl ServiceReference {
    /// Identity of the registration this reference points at.
    pub fn id(&self) -> RegistrationId {
        self.id
    }

    /// Interface the service is advertised under.
    pub fn interface(&self) -> ServiceInterface {
        self.interface
    }

    /// Name the service was registered under.
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Bundle that published the service.
    pub fn owner(&self) -> BundleId {
        self.owner
    }

    /// Properties captured when the reference was taken.
    pub fn properties(&self) -> &ServiceProperties {
        &self.properties
    }

    /// Single property value.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key)
    }
}
