//! Listener handles and the per-store listener table.
//!
//! Closures have no identity of their own, so a callback is wrapped in a
//! `Listener` that carries an identity map. Each store has an owner token;
//! the first time a store registers a listener it stamps the map with a token
//! from its `IdSource`, under its own owner token. Identities minted by
//! different stores never meet, even when their sources overlap. Every clone
//! shares the map, so registering any clone again reuses the same entry and
//! removing by any clone removes it.

use crate::tokens::{IdSource, Token};
use core::borrow::Borrow;
use core::cell::RefCell;
use core::fmt;
use core::hash::Hash;
use hashbrown::HashMap;
use indexmap::IndexMap;
use std::rc::Rc;

/// Owner token -> identity minted by that owner.
pub(crate) type IdSlots = Rc<RefCell<HashMap<Token, Token>>>;

/// A callback invoked with each value emitted on a key.
pub struct Listener<V> {
    ids: IdSlots,
    callback: Rc<dyn Fn(&V)>,
}

impl<V> Listener<V> {
    pub fn new(callback: impl Fn(&V) + 'static) -> Self {
        Self::with_slots(Rc::default(), callback)
    }

    pub fn call(&self, value: &V) {
        (self.callback)(value)
    }

    pub(crate) fn with_slots(ids: IdSlots, callback: impl Fn(&V) + 'static) -> Self {
        Self {
            ids,
            callback: Rc::new(callback),
        }
    }

    pub(crate) fn id_for(&self, owner: Token) -> Option<Token> {
        RefCell::borrow(&self.ids).get(&owner).copied()
    }

    pub(crate) fn assign_id(&self, owner: Token, id: Token) {
        self.ids.borrow_mut().insert(owner, id);
    }
}

impl<V> Clone for Listener<V> {
    fn clone(&self) -> Self {
        Self {
            ids: Rc::clone(&self.ids),
            callback: Rc::clone(&self.callback),
        }
    }
}

impl<V> fmt::Debug for Listener<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("stores", &RefCell::borrow(&self.ids).len())
            .finish()
    }
}

/// Key -> ordered (identity -> listener) slots. Keys are kept in first
/// registration order; a key whose last listener was removed stays listed
/// with an empty slot set.
pub(crate) struct ListenerTable<K, V> {
    owner: Token,
    events: IndexMap<K, IndexMap<Token, Listener<V>>>,
}

impl<K, V> ListenerTable<K, V>
where
    K: Eq + Hash + Clone,
{
    pub(crate) fn new(owner: Token) -> Self {
        Self {
            owner,
            events: IndexMap::new(),
        }
    }

    pub(crate) fn owner(&self) -> Token {
        self.owner
    }

    /// Identity of `listener` in this table's store, if it has one.
    pub(crate) fn id_of(&self, listener: &Listener<V>) -> Option<Token> {
        listener.id_for(self.owner)
    }

    /// Register `listener` on `key`, minting its identity if it has none.
    /// Re-registering an identity already present keeps its position.
    pub(crate) fn insert(
        &mut self,
        key: &K,
        listener: &Listener<V>,
        ids: &mut dyn IdSource,
    ) -> Token {
        let id = match self.id_of(listener) {
            Some(id) => id,
            None => {
                let id = ids.next_id();
                listener.assign_id(self.owner, id);
                id
            }
        };
        let slots = self.events.entry(key.clone()).or_default();
        slots.insert(id, listener.clone());
        log::trace!("listener {} registered ({} on key)", id, slots.len());
        id
    }

    pub(crate) fn remove<Q>(&mut self, key: &Q, id: Token) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let removed = self
            .events
            .get_mut(key)
            .map_or(false, |slots| slots.shift_remove(&id).is_some());
        if removed {
            log::trace!("listener {} removed", id);
        }
        removed
    }

    pub(crate) fn contains<Q>(&self, key: &Q, id: Token) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.events
            .get(key)
            .map_or(false, |slots| slots.contains_key(&id))
    }

    /// Current listeners of `key` in registration order.
    pub(crate) fn snapshot<Q>(&self, key: &Q) -> Vec<(Token, Listener<V>)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.events.get(key).map_or_else(Vec::new, |slots| {
            slots.iter().map(|(id, l)| (*id, l.clone())).collect()
        })
    }

    pub(crate) fn count<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.events.get(key).map_or(0, |slots| slots.len())
    }

    pub(crate) fn names(&self) -> Vec<K> {
        self.events.keys().cloned().collect()
    }
}
