//! Tables: the value table and future table of one namespace.
//!
//! Both tables are shared by every `Store` bound to the namespace. They are
//! mutated independently: a key may hold a value with no cell (steady state)
//! or a pending cell with no value (awaited but unset).
//!
//! Invariants
//! - At most one cell per key, hence at most one pending cell per key.
//! - A cell is only ever replaced once it has settled (`fresh_pending`).
//! - Removing a cell from the table never settles it; callers reject it.

use crate::error::Rejection;
use crate::settle::Deferred;
use core::borrow::Borrow;
use core::hash::Hash;
use hashbrown::HashMap;
use std::rc::Rc;

pub(crate) struct Tables<K, V> {
    values: HashMap<K, V>,
    cells: HashMap<K, Rc<Deferred<V>>>,
}

impl<K, V> Tables<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub(crate) fn new() -> Self {
        Self {
            values: HashMap::new(),
            cells: HashMap::new(),
        }
    }

    pub(crate) fn value<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.values.get(key)
    }

    pub(crate) fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.values.contains_key(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }

    pub(crate) fn store_value(&mut self, key: K, value: V) {
        self.values.insert(key, value);
    }

    /// The key's cell, creating a pending one if the key has none.
    pub(crate) fn cell(&mut self, key: &K) -> Rc<Deferred<V>> {
        if let Some(cell) = self.cells.get(key) {
            return Rc::clone(cell);
        }
        log::trace!("creating pending cell");
        let cell = Deferred::new();
        self.cells.insert(key.clone(), Rc::clone(&cell));
        cell
    }

    /// The key's cell, guaranteed pending: a settled cell is superseded by a
    /// fresh one so the next write always has something to fulfill.
    pub(crate) fn fresh_pending(&mut self, key: &K) -> Rc<Deferred<V>> {
        let cell = self.cell(key);
        if !cell.is_settled() {
            return cell;
        }
        log::trace!("superseding settled cell");
        let fresh = Deferred::new();
        self.cells.insert(key.clone(), Rc::clone(&fresh));
        fresh
    }

    /// Drop both entries for `key`, returning the cell (if any) so the caller
    /// can reject it after releasing the table.
    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<Rc<Deferred<V>>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.values.remove(key);
        self.cells.remove(key)
    }

    /// Empty both tables, returning every cell that was present.
    pub(crate) fn drain(&mut self) -> Vec<Rc<Deferred<V>>> {
        self.values.clear();
        self.cells.drain().map(|(_, c)| c).collect()
    }
}

/// Reject each cell, returning how many were still pending.
pub(crate) fn reject_all<V: Clone>(
    cells: impl IntoIterator<Item = Rc<Deferred<V>>>,
    reason: Rejection,
) -> usize {
    cells.into_iter().filter(|c| c.reject(reason)).count()
}
