//! Default key type: a name or an opaque token.

use crate::tokens::Token;
use core::fmt;
use std::rc::Rc;

/// Addresses one slot of a store.
///
/// Names are interchangeable: two `Key::from("a")` address the same slot.
/// Token keys are private; only holders of the token can reach the slot.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Name(Rc<str>),
    Token(Token),
}

impl Key {
    /// A fresh private key that collides with nothing.
    pub fn unique() -> Self {
        Key::Token(Token::mint())
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Key::Name(n) => Some(&**n),
            Key::Token(_) => None,
        }
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Name(Rc::from(name))
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Name(Rc::from(name))
    }
}

impl From<&Key> for Key {
    fn from(key: &Key) -> Self {
        key.clone()
    }
}

impl From<Token> for Key {
    fn from(token: Token) -> Self {
        Key::Token(token)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Name(n) => f.write_str(n),
            Key::Token(t) => write!(f, "{}", t),
        }
    }
}
