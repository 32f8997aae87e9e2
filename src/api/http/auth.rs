//! Bearer-token authorization gate for the grep endpoints.

use crate::common::error::AuthError;

/// Authorization predicate parameterized by the shared secret configured at
/// startup. An empty secret disables the gate entirely.
#[derive(Clone, Debug)]
pub struct AuthGate {
    token: String,
}

impl AuthGate {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Whether a shared secret is configured at all.
    pub fn enabled(&self) -> bool {
        !self.token.is_empty()
    }

    /// Decide whether a request carrying `header` (the raw `Authorization`
    /// value, if any) may proceed.
    ///
    /// A `Bearer ` prefix is stripped when present; a value without the
    /// prefix is compared as-is. The comparison is plain equality, not
    /// constant-time (see DESIGN.md).
    pub fn authorize(&self, header: Option<&str>) -> Result<(), AuthError> {
        if !self.enabled() {
            return Ok(());
        }
        let raw = header.unwrap_or("");
        let credential = raw.strip_prefix("Bearer ").unwrap_or(raw);
        if credential.is_empty() {
            return Err(AuthError::MalformedCredential);
        }
        if credential != self.token {
            return Err(AuthError::InvalidCredential);
        }
        Ok(())
    }
}
