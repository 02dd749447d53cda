//! Opaque unique tokens and the generators that mint them.
//!
//! A `Token` is a small copyable identity. Tokens serve two purposes: they
//! are private, collision-free keys (see `Key::unique`), and they are the
//! identity stamped on a `Listener` the first time a store registers it.
//! Stores mint listener identities through an injectable `IdSource`.

use core::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Opaque unique identity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Token(u64);

impl Token {
    /// Mint a token distinct from every other token minted in this process.
    pub fn mint() -> Self {
        let n = NEXT_TOKEN.fetch_add(1, Ordering::Relaxed);
        if n == u64::MAX {
            // Same policy as a refcount overflow: never hand out a repeat.
            std::process::abort();
        }
        Token(n)
    }

    /// Wrap a raw value. Uniqueness is then the caller's problem.
    pub const fn from_raw(raw: u64) -> Self {
        Token(raw)
    }

    pub const fn into_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An unbounded source of distinct tokens.
///
/// Stores call `next_id` once per listener, the first time that listener
/// is registered. Implementations must never return the same token twice.
pub trait IdSource {
    fn next_id(&mut self) -> Token;
}

/// Default source: draws from the process-wide token counter.
#[derive(Debug, Default, Clone, Copy)]
pub struct Minted;

impl IdSource for Minted {
    #[inline]
    fn next_id(&mut self) -> Token {
        Token::mint()
    }
}

/// Deterministic counter starting at a chosen value. Useful in tests that
/// want predictable listener identities.
#[derive(Debug)]
pub struct Sequential {
    next: u64,
}

impl Sequential {
    pub fn starting_at(first: u64) -> Self {
        Self { next: first }
    }
}

impl IdSource for Sequential {
    #[inline]
    fn next_id(&mut self) -> Token {
        let n = self.next;
        self.next = n.checked_add(1).expect("Sequential id source exhausted");
        Token(n)
    }
}

impl<F> IdSource for F
where
    F: FnMut() -> Token,
{
    fn next_id(&mut self) -> Token {
        self()
    }
}
