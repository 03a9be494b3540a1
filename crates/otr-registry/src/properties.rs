//! ---
//! otr_section: "03-service-registry"
//! otr_subsection: "module"
//! otr_type: "source"
//! otr_scope: "code"
//! otr_description: "Service registration identity, lookup, and removal."
//! otr_version: "v0.0.0-prealpha"
//! otr_owner: "tbd"
//! ---
use indexmap::IndexMap;

/// Property naming the interface a service was published under.
pub const OBJECT_CLASS: &str = "objectClass";

/// Ordered property bag attached to a registration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceProperties(IndexMap<String, String>);

impl ServiceProperties {
    /// Empty property bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a property, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    /// Value of a property.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Property keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Key/value pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for ServiceProperties
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}
