//! Bearer credential capability injected into the HTTP gateway.

use std::sync::{Arc, Mutex};

use kb_logging::kb_info;

/// Source of the bearer token attached to outgoing requests.
pub trait Credentials: Send + Sync {
    fn bearer(&self) -> Option<String>;
    fn store(&self, token: String);
    /// Forget the token after the backend rejected it.
    fn discard(&self);
}

#[derive(Debug, Clone, Default)]
pub struct MemoryCredentials {
    token: Arc<Mutex<Option<String>>>,
}

impl MemoryCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let creds = Self::new();
        creds.store(token.into());
        creds
    }
}

impl Credentials for MemoryCredentials {
    fn bearer(&self) -> Option<String> {
        self.token.lock().ok().and_then(|guard| guard.clone())
    }

    fn store(&self, token: String) {
        if let Ok(mut guard) = self.token.lock() {
            *guard = Some(token).filter(|token| !token.trim().is_empty());
        }
    }

    fn discard(&self) {
        if let Ok(mut guard) = self.token.lock() {
            if guard.take().is_some() {
                kb_info!("Discarded stored credential");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Credentials, MemoryCredentials};

    #[test]
    fn clones_share_the_same_token() {
        let creds = MemoryCredentials::with_token("abc");
        let other = creds.clone();
        assert_eq!(other.bearer().as_deref(), Some("abc"));

        other.discard();
        assert_eq!(creds.bearer(), None);
    }

    #[test]
    fn blank_tokens_are_not_stored() {
        let creds = MemoryCredentials::new();
        creds.store("  ".into());
        assert_eq!(creds.bearer(), None);
    }
}
