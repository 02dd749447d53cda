// Namespace and registry suite.
//
// Invariants exercised:
// - Stores bound to the same namespace of a registry share values and
//   requests; listeners stay per store object.
// - Different namespaces and different registries are isolated.
// - The global store is one object per thread until the registry resets.
use deferred_store::{Key, Listener, Registry, Store, DEFAULT_NAMESPACE};
use futures::executor::block_on;
use std::cell::Cell;
use std::rc::Rc;

fn counter() -> (Listener<u32>, Rc<Cell<usize>>) {
    let hits = Rc::new(Cell::new(0));
    let h = Rc::clone(&hits);
    (Listener::new(move |_: &u32| h.set(h.get() + 1)), hits)
}

// Test: data is shared within a namespace.
// Verifies: a request made on one store resolves from a write on another.
#[test]
fn same_namespace_shares_data_and_requests() {
    let reg = Registry::new();
    let a: Store<u32> = Store::builder().registry(&reg).namespace("ns").build();
    let b: Store<u32> = Store::builder().registry(&reg).namespace("ns").build();
    let key = Key::from("k");

    let req = a.request(&key);
    b.set(key.clone(), 3);
    assert_eq!(a.get(&key), Some(3));
    assert_eq!(block_on(req), Ok(3));
    assert_eq!(a.namespace(), "ns");
}

// Test: events are local to the store object.
#[test]
fn listeners_are_per_store() {
    let reg = Registry::new();
    let a: Store<u32> = Store::builder().registry(&reg).namespace("ns").build();
    let b: Store<u32> = Store::builder().registry(&reg).namespace("ns").build();
    let key = Key::from("k");
    let (l, hits) = counter();
    a.on(&key, &l);

    b.upsert(key.clone(), 1);
    assert_eq!(hits.get(), 0);
    a.upsert(key.clone(), 2);
    assert_eq!(hits.get(), 1);
    assert!(b.event_names().is_empty());

    // A clone is the same store object.
    a.clone().upsert(key, 3);
    assert_eq!(hits.get(), 2);
}

// Test: namespaces and registries isolate data.
#[test]
fn namespaces_are_isolated() {
    let reg = Registry::new();
    let a: Store<u32> = Store::builder().registry(&reg).namespace("one").build();
    let b: Store<u32> = Store::builder().registry(&reg).namespace("two").build();
    let other: Store<u32> = Store::builder()
        .registry(&Registry::new())
        .namespace("one")
        .build();
    let key = Key::from("k");

    a.set(key.clone(), 1);
    assert_eq!(b.get(&key), None);
    assert_eq!(other.get(&key), None);

    b.clear();
    assert_eq!(a.get(&key), Some(1));

    let mut names = reg.namespaces();
    names.sort();
    assert_eq!(names, vec!["one".to_string(), "two".to_string()]);
}

// Test: default namespace through the thread default registry.
// Verifies: Store::new and Store::default join the same data.
#[test]
fn thread_default_registry_shares_default_namespace() {
    let key = Key::unique();
    let a: Store<u32> = Store::default();
    let b: Store<u32> = Store::new(DEFAULT_NAMESPACE);
    a.set(key.clone(), 11);
    assert_eq!(b.get(&key), Some(11));
    assert!(Registry::<u32>::thread_default().contains(DEFAULT_NAMESPACE));
}

// Test: global singleton.
// Verifies: every call returns the same object (shared listeners) and it
// shares data with other stores on the default namespace; reset detaches it.
#[test]
fn global_store_is_a_singleton_until_reset() {
    type S = Store<u64>;
    let key = Key::unique();
    let hits = Rc::new(Cell::new(0));
    let h = Rc::clone(&hits);
    S::global().on(&key, &Listener::new(move |_: &u64| h.set(h.get() + 1)));
    S::global().upsert(key.clone(), 1);
    assert_eq!(hits.get(), 1);
    assert_eq!(S::global().namespace(), DEFAULT_NAMESPACE);
    assert_eq!(S::new(DEFAULT_NAMESPACE).get(&key), Some(1));

    Registry::<u64>::thread_default().reset();
    let fresh = S::global();
    assert_eq!(fresh.get(&key), None);
    assert!(fresh.event_names().is_empty());
}

// Test: custom key types.
#[test]
fn stores_accept_any_hashable_key() {
    let st: Store<&'static str, (u8, u8)> = Store::builder()
        .registry(&Registry::new())
        .build();
    st.set((1, 2), "pair");
    assert_eq!(st.get(&(1, 2)), Some("pair"));
    assert!(!st.has(&(2, 1)));
}
