//! deferred-store: a single-threaded, namespaced key/value store whose
//! values can be requested before they exist.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: let code wait for a key that some other code will write later,
//!   and let code react to every write of a key.
//! - Layers:
//!   - Deferred<V> (settle): a settle-once cell; pending until fulfilled or
//!     rejected, then frozen. `Request<V>` is the public future over it.
//!   - Tables<K, V> (table): a namespace's value table and future table.
//!     Knows how to create a cell lazily and supersede a settled one.
//!   - Registry<V, K>: maps namespace names to shared tables; one default
//!     registry per thread, or an explicit one for isolation.
//!   - ListenerTable<K, V> (listeners): per-store ordered listener slots
//!     keyed by listener identity.
//!   - Store<V, K>: public API joining one namespace's tables with its own
//!     listener table.
//!
//! Request lifecycle
//! - Created pending on first `request`/`pull` or on the first write to a
//!   key that has none.
//! - Fulfilled by the first write after creation. A later write finds it
//!   settled and swaps in a fresh pending cell before fulfilling, so each
//!   write after a settlement starts a new waitable cycle.
//! - `delete`/`clear` drop the cell from the table and reject it; rejecting a
//!   settled cell is a no-op.
//! - Settling a cell only wakes its waiters; they observe the outcome when
//!   their executor polls them, never during the write itself.
//!
//! Constraints
//! - Single-threaded: `!Send`/`!Sync` (Rc + RefCell), no locks. All table
//!   mutations run to completion; listener calls happen with no internal
//!   borrow held, so listeners may call back into the store.
//! - Data is per namespace; listeners are per store object.
//!
//! Listener failures
//! - Listeners run synchronously and unguarded. A panicking listener skips
//!   the remaining listeners and unwinds out of the triggering write. The
//!   value is already stored and the request settled by then.
//!
//! Notes and non-goals
//! - No persistence, no cross-thread or cross-process sharing.
//! - No ordering guarantees between unrelated keys.
//! - No cancellation other than `delete`/`clear`; timeouts belong to the
//!   caller (wrap the `Request`).
//!
//! ```
//! use deferred_store::{Key, Registry, Store};
//!
//! let store: Store<i32> = Store::builder().registry(&Registry::new()).build();
//! let key = Key::from("answer");
//! let pending = store.request(&key);
//! assert!(!pending.is_settled());
//! store.set(key.clone(), 42);
//! assert_eq!(pending.peek(), Some(Ok(42)));
//! ```

mod error;
mod key;
mod listeners;
mod registry;
mod settle;
mod store;
mod table;
pub mod tokens;

// Public surface
pub use error::Rejection;
pub use key::Key;
pub use listeners::Listener;
pub use registry::{Registry, DEFAULT_NAMESPACE};
pub use settle::Request;
pub use store::{Pull, Store, StoreBuilder};
pub use tokens::{IdSource, Token};
