//! ---
//! otr_section: "01-core-functionality"
//! otr_subsection: "module"
//! otr_type: "source"
//! otr_scope: "code"
//! otr_description: "Shared primitives and utilities for the bundle test runtime."
//! otr_version: "v0.0.0-prealpha"
//! otr_owner: "tbd"
//! ---
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier assigned to a bundle by the runtime that created it.
///
/// Identifiers start at 1 and are never reused within one bundle table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BundleId(u64);

impl BundleId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BundleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for BundleId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}
