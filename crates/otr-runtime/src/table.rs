//! ---
//! otr_section: "04-lifecycle-orchestration"
//! otr_subsection: "module"
//! otr_type: "source"
//! otr_scope: "code"
//! otr_description: "Bundle lifecycle simulation and deploy orchestration."
//! otr_version: "v0.0.0-prealpha"
//! otr_owner: "tbd"
//! ---
use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use otr_common::BundleId;
use parking_lot::Mutex;

use crate::bundle::Bundle;

#[derive(Debug, Default)]
struct TableInner {
    last_id: u64,
    // Insertion ordered; iteration order is the event delivery order.
    live: IndexMap<BundleId, Arc<Bundle>>,
    by_name: HashMap<String, BundleId>,
}

/// Live bundle set with its id and name indices.
///
/// One table may be shared by several runtimes so they see each other's
/// bundles. Ids come from the table and are never reused.
#[derive(Debug, Default)]
pub struct BundleTable {
    inner: Mutex<TableInner>,
}

impl BundleTable {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn allocate_id(&self) -> BundleId {
        let mut inner = self.inner.lock();
        inner.last_id += 1;
        BundleId::new(inner.last_id)
    }

    /// Track `bundle`, returning the bundles that were live before it.
    pub(crate) fn insert(&self, bundle: Arc<Bundle>) -> Vec<Arc<Bundle>> {
        let mut inner = self.inner.lock();
        let others = inner.live.values().cloned().collect();
        inner
            .by_name
            .insert(bundle.symbolic_name().to_owned(), bundle.id());
        inner.live.insert(bundle.id(), bundle);
        others
    }

    /// Stop tracking `id`, returning the removed bundle and the bundles still live.
    pub(crate) fn remove(&self, id: BundleId) -> Option<(Arc<Bundle>, Vec<Arc<Bundle>>)> {
        let mut inner = self.inner.lock();
        let removed = inner.live.shift_remove(&id)?;
        let name = removed.symbolic_name();
        if inner.by_name.get(name) == Some(&id) {
            let successor = inner
                .live
                .values()
                .rev()
                .find(|bundle| bundle.symbolic_name() == name)
                .map(|bundle| bundle.id());
            match successor {
                Some(next) => {
                    inner.by_name.insert(name.to_owned(), next);
                }
                None => {
                    inner.by_name.remove(name);
                }
            }
        }
        let remaining = inner.live.values().cloned().collect();
        Some((removed, remaining))
    }

    /// Live bundles in creation order.
    pub fn snapshot(&self) -> Vec<Arc<Bundle>> {
        self.inner.lock().live.values().cloned().collect()
    }

    pub fn by_id(&self, id: BundleId) -> Option<Arc<Bundle>> {
        self.inner.lock().live.get(&id).cloned()
    }

    /// Most recently created live bundle with this name.
    pub fn by_symbolic_name(&self, name: &str) -> Option<Arc<Bundle>> {
        let inner = self.inner.lock();
        inner
            .by_name
            .get(name)
            .and_then(|id| inner.live.get(id))
            .cloned()
    }

    pub fn contains(&self, id: BundleId) -> bool {
        self.inner.lock().live.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().live.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use otr_content::ClasspathLoader;
    use otr_registry::ServiceRegistry;

    fn add(table: &Arc<BundleTable>, name: &str) -> Arc<Bundle> {
        let bundle = Arc::new(Bundle::new(
            table.allocate_id(),
            name,
            Arc::new(ServiceRegistry::new()),
            Arc::downgrade(table),
            Arc::new(ClasspathLoader::default()),
        ));
        table.insert(bundle.clone());
        bundle
    }

    #[test]
    fn ids_increase_and_are_not_reused() {
        let table = BundleTable::new();
        let a = add(&table, "a");
        let b = add(&table, "b");
        table.remove(b.id()).unwrap();
        let c = add(&table, "c");
        assert!(table.contains(a.id()) && table.contains(c.id()));
        assert!(!table.contains(b.id()));
        assert_eq!(a.id(), BundleId::new(1));
        assert!(a.id() < b.id() && b.id() < c.id());
    }

    #[test]
    fn insert_reports_previously_live_bundles() {
        let table = BundleTable::new();
        let a = add(&table, "a");
        let b = Arc::new(Bundle::new(
            table.allocate_id(),
            "b",
            Arc::new(ServiceRegistry::new()),
            Arc::downgrade(&table),
            Arc::new(ClasspathLoader::default()),
        ));
        let others = table.insert(b);
        assert_eq!(others.len(), 1);
        assert_eq!(others[0].id(), a.id());
    }

    #[test]
    fn name_index_falls_back_to_latest_survivor() {
        let table = BundleTable::new();
        let first = add(&table, "dup");
        let second = add(&table, "dup");
        let third = add(&table, "dup");
        assert_eq!(table.by_symbolic_name("dup").unwrap().id(), third.id());

        table.remove(third.id()).unwrap();
        assert_eq!(table.by_symbolic_name("dup").unwrap().id(), second.id());

        table.remove(first.id()).unwrap();
        assert_eq!(table.by_symbolic_name("dup").unwrap().id(), second.id());

        table.remove(second.id()).unwrap();
        assert!(table.by_symbolic_name("dup").is_none());
        assert!(table.is_empty());
    }

    #[test]
    fn removing_unknown_bundle_is_none() {
        let table = BundleTable::new();
        let a = add(&table, "a");
        table.remove(a.id()).unwrap();
        assert!(table.remove(a.id()).is_none());
        assert!(table.by_id(a.id()).is_none());
    }
}
