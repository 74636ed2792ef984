use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Identity resolved from a bearer token. The upstream identity provider
/// is out of scope; the email is the account key everywhere downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub email: String,
    pub name: String,
}

/// In-process session registry mapping opaque tokens to signed-in users.
#[derive(Clone, Default)]
pub struct Sessions {
    inner: Arc<Mutex<HashMap<String, SessionUser>>>,
}

impl Sessions {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> MutexGuard<'_, HashMap<String, SessionUser>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn issue(&self, email: impl Into<String>, name: impl Into<String>) -> String {
        let token = format!(
            "{:016x}{:016x}",
            rand::random::<u64>(),
            rand::random::<u64>()
        );
        self.guard().insert(
            token.clone(),
            SessionUser {
                email: email.into(),
                name: name.into(),
            },
        );
        token
    }

    pub fn resolve(&self, token: &str) -> Option<SessionUser> {
        self.guard().get(token).cloned()
    }

    pub fn revoke(&self, token: &str) -> bool {
        self.guard().remove(token).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_tokens_resolve_until_revoked() {
        let sessions = Sessions::new();
        let token = sessions.issue("jin-woo@example.com", "Jin-Woo");

        let user = sessions.resolve(&token).expect("session resolves");
        assert_eq!(user.email, "jin-woo@example.com");

        assert!(sessions.revoke(&token));
        assert!(sessions.resolve(&token).is_none());
        assert!(!sessions.revoke(&token));
    }

    #[test]
    fn tokens_are_unique_per_issue() {
        let sessions = Sessions::new();
        let first = sessions.issue("a@example.com", "A");
        let second = sessions.issue("a@example.com", "A");
        assert_ne!(first, second);
    }
}
