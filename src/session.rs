use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

/// Shared in-memory session handed to [`crate::api::ApiClient`].
///
/// Holds the access/refresh token pair and the authenticated flag that the
/// embedding application's route guard consumes. Cloning is cheap; every
/// clone points at the same state.
#[derive(Debug, Clone, Default)]
pub struct Session {
    inner: Arc<Mutex<SessionState>>,
}

#[derive(Debug, Default)]
struct SessionState {
    access_token: Option<String>,
    refresh_token: Option<String>,
    authenticated: bool,
}

/// Serializable snapshot of the stored credentials.
///
/// The field names match the key names the browser client kept in local
/// storage, so persisted sessions stay interchangeable between the two.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTokens {
    #[serde(rename = "token")]
    pub access_token: Option<String>,
    #[serde(rename = "refreshToken")]
    pub refresh_token: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn access_token(&self) -> Option<String> {
        self.lock().access_token.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.lock().refresh_token.clone()
    }

    /// Stores a new access token. Empty strings are ignored so a partial
    /// server answer never wipes a working credential.
    pub fn set_access_token(&self, token: &str) {
        if token.is_empty() {
            return;
        }
        self.lock().access_token = Some(token.to_string());
    }

    /// Stores a new refresh token. Empty strings are ignored.
    pub fn set_refresh_token(&self, token: &str) {
        if token.is_empty() {
            return;
        }
        self.lock().refresh_token = Some(token.to_string());
    }

    /// Flags the session as logged in, the equivalent of the `pm_auth`
    /// cookie the web client set for its redirect filter.
    pub fn mark_authenticated(&self) {
        self.lock().authenticated = true;
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock().authenticated
    }

    /// Drops both tokens and the authenticated flag. Called on logout and
    /// whenever the server answers 401.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.access_token = None;
        state.refresh_token = None;
        state.authenticated = false;
    }

    /// Snapshot for callers that persist credentials between runs.
    pub fn export(&self) -> StoredTokens {
        let state = self.lock();
        StoredTokens {
            access_token: state.access_token.clone(),
            refresh_token: state.refresh_token.clone(),
        }
    }

    /// Restores a persisted snapshot. A snapshot with an access token marks
    /// the session authenticated.
    pub fn restore(&self, tokens: StoredTokens) {
        let mut state = self.lock();
        state.authenticated = tokens.access_token.is_some();
        state.access_token = tokens.access_token;
        state.refresh_token = tokens.refresh_token;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SessionState> {
        // Keep the token state usable even after a panicked holder.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_read_tokens() {
        let session = Session::new();
        assert_eq!(session.access_token(), None);

        session.set_access_token("abc");
        session.set_refresh_token("def");
        assert_eq!(session.access_token().as_deref(), Some("abc"));
        assert_eq!(session.refresh_token().as_deref(), Some("def"));
    }

    #[test]
    fn test_empty_tokens_are_ignored() {
        let session = Session::new();
        session.set_access_token("abc");
        session.set_access_token("");
        assert_eq!(session.access_token().as_deref(), Some("abc"));

        session.set_refresh_token("");
        assert_eq!(session.refresh_token(), None);
    }

    #[test]
    fn test_clear_removes_everything() {
        let session = Session::new();
        session.set_access_token("abc");
        session.set_refresh_token("def");
        session.mark_authenticated();

        session.clear();
        assert_eq!(session.access_token(), None);
        assert_eq!(session.refresh_token(), None);
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_clones_share_state() {
        let session = Session::new();
        let other = session.clone();
        other.set_access_token("shared");
        assert_eq!(session.access_token().as_deref(), Some("shared"));
    }

    #[test]
    fn test_export_uses_browser_storage_keys() {
        let session = Session::new();
        session.set_access_token("a1");
        session.set_refresh_token("r1");

        let json = serde_json::to_value(session.export()).unwrap();
        assert_eq!(json["token"], "a1");
        assert_eq!(json["refreshToken"], "r1");
    }

    #[test]
    fn test_restore_round_trip() {
        let session = Session::new();
        session.set_access_token("a1");
        session.set_refresh_token("r1");
        session.mark_authenticated();

        let restored = Session::new();
        restored.restore(session.export());
        assert_eq!(restored.access_token().as_deref(), Some("a1"));
        assert_eq!(restored.refresh_token().as_deref(), Some("r1"));
        assert!(restored.is_authenticated());
    }
}
