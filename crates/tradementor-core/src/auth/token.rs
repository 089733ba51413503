use std::fmt;
use std::sync::RwLock;

/// Opaque bearer credential. An empty token means "no credential".
///
/// `Debug` never prints the value, so a token can sit inside structs that
/// get logged without leaking.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str("Token(<empty>)")
        } else {
            f.write_str("Token(<redacted>)")
        }
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// In-memory holder of the live bearer token.
///
/// One instance is shared (via `Arc`) by the gateway, which reads it when
/// building headers, and the session manager, which is the only writer.
/// Nothing here touches durable storage.
#[derive(Debug, Default)]
pub struct CredentialStore {
    slot: RwLock<Token>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current token; empty when signed out.
    pub fn get(&self) -> Token {
        // A poisoned lock still holds a whole Token, so keep using it
        self.slot
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Replace the token. Last write wins.
    pub fn set(&self, token: Token) {
        *self
            .slot
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = token;
    }

    pub fn clear(&self) {
        self.set(Token::empty());
    }

    pub fn is_present(&self) -> bool {
        !self
            .slot
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_empty()
    }
}
