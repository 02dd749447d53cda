//! Rejection reasons delivered to pending requests.

/// Why a pending `Request` was rejected instead of fulfilled.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum Rejection {
    /// The key was deleted while the request was pending.
    #[error("key was deleted before a value was assigned")]
    Deleted,
    /// The store was cleared while the request was pending.
    #[error("store was cleared before a value was assigned")]
    Cleared,
}

impl Rejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rejection::Deleted => "DELETED",
            Rejection::Cleared => "CLEARED",
        }
    }
}
