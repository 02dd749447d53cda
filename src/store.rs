//! Store: the public face over a namespace's tables and a listener table.

use crate::error::Rejection;
use crate::key::Key;
use crate::listeners::{IdSlots, Listener, ListenerTable};
use crate::registry::{Registry, SharedTables, DEFAULT_NAMESPACE};
use crate::settle::Request;
use crate::table::reject_all;
use crate::tokens::{IdSource, Minted, Token};
use core::borrow::Borrow;
use core::cell::RefCell;
use core::fmt;
use core::hash::Hash;
use core::iter::FusedIterator;
use std::rc::Rc;

/// Namespaced key/value store whose values can be awaited before they exist.
///
/// Data (values and pending requests) belongs to the namespace and is seen
/// by every store bound to it. Listeners belong to this store object only;
/// clones of a `Store` are the same object and share them.
///
/// Keys follow the `HashMap` convention: operations that may create an
/// entry for the key (`set`, `upsert`, `request`, `pull`, `on`, `once`) take
/// anything convertible into `K`; pure lookups and removals take a borrowed
/// form `&Q` of the key.
///
/// Listener panics are not caught. A panicking listener aborts the rest of
/// the emit and unwinds out of the `upsert`/`set` that triggered it; by then
/// the value is stored and the request fulfilled.
pub struct Store<V, K = Key> {
    namespace: Rc<str>,
    data: SharedTables<K, V>,
    events: Rc<RefCell<ListenerTable<K, V>>>,
    ids: Rc<RefCell<Box<dyn IdSource>>>,
}

/// Configures a `Store` before it joins its namespace.
pub struct StoreBuilder<V, K = Key> {
    namespace: String,
    registry: Option<Registry<V, K>>,
    ids: Option<Box<dyn IdSource>>,
}

impl<V, K> StoreBuilder<V, K>
where
    K: Clone + Eq + Hash + 'static,
    V: Clone + PartialEq + 'static,
{
    fn new() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            registry: None,
            ids: None,
        }
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Resolve the namespace in `registry` instead of the thread default.
    pub fn registry(mut self, registry: &Registry<V, K>) -> Self {
        self.registry = Some(registry.clone());
        self
    }

    /// Source of listener identities. Defaults to process-wide tokens.
    pub fn id_source(mut self, ids: impl IdSource + 'static) -> Self {
        self.ids = Some(Box::new(ids));
        self
    }

    pub fn build(self) -> Store<V, K> {
        let registry = self.registry.unwrap_or_else(Registry::thread_default);
        Store {
            data: registry.tables(&self.namespace),
            namespace: Rc::from(self.namespace),
            events: Rc::new(RefCell::new(ListenerTable::new(Token::mint()))),
            ids: Rc::new(RefCell::new(self.ids.unwrap_or_else(|| Box::new(Minted)))),
        }
    }
}

impl<V, K> Store<V, K>
where
    K: Clone + Eq + Hash + 'static,
    V: Clone + PartialEq + 'static,
{
    /// A new store object bound to `namespace` in the thread default registry.
    pub fn new(namespace: &str) -> Self {
        Self::builder().namespace(namespace).build()
    }

    pub fn builder() -> StoreBuilder<V, K> {
        StoreBuilder::new()
    }

    /// The shared store of the default namespace. Every call on this thread
    /// returns the same object (listeners included).
    pub fn global() -> Self {
        Registry::thread_default().global_store()
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    // ---- read path ----

    /// Snapshot of the current value. Never creates state.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        RefCell::borrow(&self.data).value(key).cloned()
    }

    pub fn has<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        RefCell::borrow(&self.data).contains(key)
    }

    /// The key's request, created pending on first access.
    ///
    /// Calls made before settlement return the same request. Once settled,
    /// the same (settled) request keeps being returned until a later write
    /// supersedes it.
    pub fn request(&self, key: impl Into<K>) -> Request<V> {
        self.request_of(&key.into())
    }

    /// Endless sequence of `request(key)` lookups, made lazily as each item
    /// is taken. Two items taken without a write in between are the same
    /// request; await one before taking the next.
    pub fn pull(&self, key: impl Into<K>) -> Pull<V, K> {
        Pull {
            store: self.clone(),
            key: key.into(),
        }
    }

    pub fn len(&self) -> usize {
        RefCell::borrow(&self.data).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ---- write path ----

    /// Write only if the key has no value. Returns the value now stored.
    pub fn set(&self, key: impl Into<K>, value: V) -> V {
        let key = key.into();
        if let Some(existing) = self.get(&key) {
            return existing;
        }
        self.upsert(key, value)
    }

    /// Write unconditionally, unless the stored value is already equal, in
    /// which case nothing happens at all.
    ///
    /// Otherwise the value is stored, the key's pending request is fulfilled
    /// (a settled one is first superseded by a fresh request) and the value is
    /// emitted to this store's listeners on the key.
    pub fn upsert(&self, key: impl Into<K>, value: V) -> V {
        let key = key.into();
        let cell = {
            let mut data = self.data.borrow_mut();
            if data.value(&key) == Some(&value) {
                return value;
            }
            data.store_value(key.clone(), value.clone());
            data.fresh_pending(&key)
        };
        cell.fulfill(value.clone());
        self.emit(&key, &value);
        value
    }

    /// Remove the value and the request of `key`, rejecting the request with
    /// `Rejection::Deleted` if it was still pending. Emits nothing.
    pub fn delete<Q>(&self, key: &Q)
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let cell = self.data.borrow_mut().remove(key);
        if reject_all(cell, Rejection::Deleted) > 0 {
            log::debug!("rejected pending request on delete");
        }
    }

    /// Reject every pending request with `Rejection::Cleared`, then empty the
    /// namespace. Emits nothing.
    pub fn clear(&self) {
        let cells = self.data.borrow_mut().drain();
        let total = cells.len();
        let rejected = reject_all(cells, Rejection::Cleared);
        log::debug!(
            "cleared namespace {:?}: {} requests, {} rejected",
            self.namespace,
            total,
            rejected
        );
    }

    // ---- events ----

    /// Register `listener` on `key`. Registering the same listener (or a
    /// clone of it) again is a no-op.
    pub fn on(&self, key: impl Into<K>, listener: &Listener<V>) -> &Self {
        self.register(&key.into(), listener);
        self
    }

    /// Register `listener` to run on the next emit of `key` only.
    ///
    /// The listener's identity is re-pointed at the one-shot wrapper, so
    /// `remove_listener(key, listener)` cancels it before it fires.
    pub fn once(&self, key: impl Into<K>, listener: &Listener<V>) -> &Self {
        let key = key.into();
        let owner = RefCell::borrow(&self.events).owner();
        let events = Rc::downgrade(&self.events);
        let inner = listener.clone();
        let k = key.clone();
        let own = IdSlots::default();
        let wrapper = Listener::with_slots(Rc::clone(&own), move |value: &V| {
            inner.call(value);
            let id = RefCell::borrow(&own).get(&owner).copied();
            if let (Some(events), Some(id)) = (events.upgrade(), id) {
                events.borrow_mut().remove(&k, id);
            }
        });
        let id = self.register(&key, &wrapper);
        listener.assign_id(owner, id);
        self
    }

    pub fn remove_listener<Q>(&self, key: &Q, listener: &Listener<V>) -> &Self
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let id = RefCell::borrow(&self.events).id_of(listener);
        if let Some(id) = id {
            self.events.borrow_mut().remove(key, id);
        }
        self
    }

    /// Identity this store gave `listener`, if it ever registered it.
    pub fn listener_id(&self, listener: &Listener<V>) -> Option<Token> {
        RefCell::borrow(&self.events).id_of(listener)
    }

    /// Keys that have had a listener registered on this store.
    pub fn event_names(&self) -> Vec<K> {
        RefCell::borrow(&self.events).names()
    }

    pub fn listener_count<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        RefCell::borrow(&self.events).count(key)
    }

    /// Call each listener of `key` with `value`, in registration order.
    ///
    /// Listeners registered during the emit are not called by it; listeners
    /// removed during the emit are skipped if not yet reached.
    pub fn emit<Q>(&self, key: &Q, value: &V) -> &Self
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let listeners = RefCell::borrow(&self.events).snapshot(key);
        for (id, listener) in listeners {
            let live = RefCell::borrow(&self.events).contains(key, id);
            if live {
                listener.call(value);
            }
        }
        self
    }

    fn request_of(&self, key: &K) -> Request<V> {
        Request::new(self.data.borrow_mut().cell(key))
    }

    fn register(&self, key: &K, listener: &Listener<V>) -> Token {
        let mut ids = self.ids.borrow_mut();
        self.events.borrow_mut().insert(key, listener, &mut **ids)
    }
}

impl<V, K> Default for Store<V, K>
where
    K: Clone + Eq + Hash + 'static,
    V: Clone + PartialEq + 'static,
{
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

impl<V, K> Clone for Store<V, K> {
    fn clone(&self) -> Self {
        Self {
            namespace: Rc::clone(&self.namespace),
            data: Rc::clone(&self.data),
            events: Rc::clone(&self.events),
            ids: Rc::clone(&self.ids),
        }
    }
}

impl<V, K> fmt::Debug for Store<V, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

/// Endless lazy sequence of requests for one key. See `Store::pull`.
pub struct Pull<V, K = Key> {
    store: Store<V, K>,
    key: K,
}

impl<V, K> Iterator for Pull<V, K>
where
    K: Clone + Eq + Hash + 'static,
    V: Clone + PartialEq + 'static,
{
    type Item = Request<V>;

    fn next(&mut self) -> Option<Request<V>> {
        Some(self.store.request_of(&self.key))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

impl<V, K> FusedIterator for Pull<V, K>
where
    K: Clone + Eq + Hash + 'static,
    V: Clone + PartialEq + 'static,
{
}
