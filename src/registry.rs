//! Namespace registry.
//!
//! A `Registry` maps namespace names to the shared `Tables` of that
//! namespace. Stores built against the same registry and namespace observe
//! the same data. Each thread has one default registry per `(K, V)` pair;
//! tests that need isolation build their own or call `reset`.

use crate::key::Key;
use crate::store::Store;
use crate::table::Tables;
use core::any::{Any, TypeId};
use core::cell::RefCell;
use core::hash::Hash;
use hashbrown::HashMap;
use std::rc::Rc;

/// Namespace used when none is given.
pub const DEFAULT_NAMESPACE: &str = "global";

pub(crate) type SharedTables<K, V> = Rc<RefCell<Tables<K, V>>>;

struct Inner<K, V> {
    namespaces: HashMap<Rc<str>, SharedTables<K, V>>,
    global: Option<Store<V, K>>,
}

/// Handle on a set of namespaces. Clones refer to the same registry.
pub struct Registry<V, K = Key> {
    inner: Rc<RefCell<Inner<K, V>>>,
}

thread_local! {
    static DEFAULTS: RefCell<HashMap<TypeId, Box<dyn Any>>> = RefCell::new(HashMap::new());
}

impl<K, V> Registry<V, K>
where
    K: Clone + Eq + Hash + 'static,
    V: Clone + PartialEq + 'static,
{
    /// An isolated registry that shares nothing with any other.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                namespaces: HashMap::new(),
                global: None,
            })),
        }
    }

    /// This thread's default registry for `(K, V)`.
    pub fn thread_default() -> Self {
        DEFAULTS.with(|defaults| {
            let mut defaults = defaults.borrow_mut();
            let slot = defaults
                .entry(TypeId::of::<Registry<V, K>>())
                .or_insert_with(|| Box::new(Registry::<V, K>::new()) as Box<dyn Any>);
            match slot.downcast_ref::<Registry<V, K>>() {
                Some(r) => r.clone(),
                None => unreachable!("default registry slot keyed by its own TypeId"),
            }
        })
    }

    /// The store bound to `DEFAULT_NAMESPACE`, created on first use and
    /// returned again by every later call until `reset`.
    pub fn global_store(&self) -> Store<V, K> {
        if let Some(store) = &self.inner.borrow().global {
            return store.clone();
        }
        let store = Store::builder()
            .registry(self)
            .namespace(DEFAULT_NAMESPACE)
            .build();
        self.inner.borrow_mut().global = Some(store.clone());
        store
    }

    pub fn contains(&self, namespace: &str) -> bool {
        self.inner.borrow().namespaces.contains_key(namespace)
    }

    pub fn namespaces(&self) -> Vec<String> {
        self.inner
            .borrow()
            .namespaces
            .keys()
            .map(|n| n.to_string())
            .collect()
    }

    /// Forget every namespace and the global store. Stores already built
    /// keep their data; stores built afterwards start empty.
    pub fn reset(&self) {
        let mut inner = self.inner.borrow_mut();
        log::debug!("resetting registry ({} namespaces)", inner.namespaces.len());
        inner.namespaces.clear();
        inner.global = None;
    }

    pub(crate) fn tables(&self, namespace: &str) -> SharedTables<K, V> {
        let mut inner = self.inner.borrow_mut();
        if let Some(t) = inner.namespaces.get(namespace) {
            return Rc::clone(t);
        }
        log::debug!("creating namespace {:?}", namespace);
        let t = Rc::new(RefCell::new(Tables::new()));
        inner.namespaces.insert(Rc::from(namespace), Rc::clone(&t));
        t
    }
}

impl<K, V> Default for Registry<V, K>
where
    K: Clone + Eq + Hash + 'static,
    V: Clone + PartialEq + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Clone for Registry<V, K> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<K, V> PartialEq for Registry<V, K> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_namespace_shares_tables() {
        let r: Registry<i32, String> = Registry::new();
        let a = r.tables("ns");
        let b = r.tables("ns");
        assert!(Rc::ptr_eq(&a, &b));
        assert!(!Rc::ptr_eq(&a, &r.tables("other")));
        let mut names = r.namespaces();
        names.sort();
        assert_eq!(names, vec!["ns".to_string(), "other".to_string()]);
    }

    #[test]
    fn thread_default_is_stable_per_type() {
        let a = Registry::<i32, String>::thread_default();
        let b = Registry::<i32, String>::thread_default();
        assert!(a == b);
    }

    #[test]
    fn reset_detaches_namespaces() {
        let r: Registry<i32, String> = Registry::new();
        let before = r.tables("ns");
        r.reset();
        assert!(!r.contains("ns"));
        assert!(!Rc::ptr_eq(&before, &r.tables("ns")));
    }
}
