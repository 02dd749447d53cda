// Rejection suite: delete and clear.
//
// Invariants exercised:
// - Only requests pending at the time of delete/clear are rejected.
// - Settled requests are left alone (rejecting them is a no-op).
// - A request made after delete/clear is new and pending.
use deferred_store::{Key, Registry, Rejection, Store};
use futures::executor::block_on;
use futures::FutureExt;

fn store() -> Store<&'static str> {
    let _ = env_logger::builder().is_test(true).try_init();
    Store::builder().registry(&Registry::new()).build()
}

// Test: delete rejects a pending request.
#[test]
fn delete_rejects_pending_request() {
    let st = store();
    let key = Key::unique();
    let req = st.request(&key);
    st.delete(&key);
    assert_eq!(block_on(req), Err(Rejection::Deleted));
}

// Test: request after delete.
// Assumes: the key had a value whose request was fulfilled.
// Verifies: the next request is new and stays pending; the old one keeps
// its value.
#[test]
fn request_after_delete_is_new_and_pending() {
    let st = store();
    let key = Key::unique();
    st.set(key.clone(), "PASSED");
    let old = st.request(&key);
    st.delete(&key);
    assert!(!st.has(&key));

    let req = st.request(&key);
    assert_ne!(req, old);
    assert!(req.clone().now_or_never().is_none());
    assert_eq!(old.peek(), Some(Ok("PASSED")));

    st.set(key, "AGAIN");
    assert_eq!(block_on(req), Ok("AGAIN"));
}

// Test: deleting a key nobody requested.
#[test]
fn delete_without_request_is_silent() {
    let st = store();
    let key = Key::unique();
    st.set(key.clone(), "v");
    st.delete(&key);
    st.delete(&Key::unique());
    assert_eq!(st.get(&key), None);
}

// Test: clear rejects every pending request.
// Verifies: both waiters see Cleared and the values are gone.
#[test]
fn clear_rejects_all_pending() {
    let st = store();
    let a = Key::unique();
    let b = Key::unique();
    let ra = st.request(&a);
    let rb = st.request(&b);
    st.set(Key::from("unrelated"), "kept?");
    st.clear();

    assert_eq!(block_on(ra), Err(Rejection::Cleared));
    assert_eq!(block_on(rb), Err(Rejection::Cleared));
    assert_eq!(st.get(&a), None);
    assert_eq!(st.get(&Key::from("unrelated")), None);
    assert!(st.is_empty());
}

// Test: clear leaves settled requests fulfilled.
#[test]
fn clear_does_not_touch_settled_requests() {
    let st = store();
    let key = Key::unique();
    st.set(key.clone(), "done");
    let settled = st.request(&key);
    st.clear();
    assert_eq!(settled.peek(), Some(Ok("done")));

    let fresh = st.request(&key);
    assert_ne!(fresh, settled);
    assert!(!fresh.is_settled());
}

// Test: a rejected waiter can retry with a fresh request.
#[test]
fn retry_after_rejection() {
    let st = store();
    let key = Key::unique();
    let first = st.request(&key);
    st.delete(&key);
    assert_eq!(first.peek(), Some(Err(Rejection::Deleted)));

    let retry = st.request(&key);
    st.upsert(key, "late");
    assert_eq!(block_on(retry), Ok("late"));
}

#[test]
fn rejection_reasons_render() {
    assert_eq!(Rejection::Deleted.as_str(), "DELETED");
    assert_eq!(Rejection::Cleared.as_str(), "CLEARED");
    assert!(Rejection::Cleared.to_string().contains("cleared"));
    let err: Box<dyn std::error::Error> = Box::new(Rejection::Deleted);
    assert!(err.to_string().contains("deleted"));
}
