//! The backend-as-a-service contract.

use crate::error::Result;
use crate::models::{AuthEvent, Credential, CredentialDraft, Session};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;

/// Receiving end of an auth-state subscription. Drop it to unsubscribe.
pub type AuthSubscription = Receiver<AuthEvent>;

/// Remote table and auth operations used by the client.
///
/// Row visibility is scoped by the backend to the session's user, so the
/// list call takes no owner filter.
pub trait Backend: Send + Sync {
    /// Current session, if any.
    fn get_session(&self) -> Result<Option<Session>>;

    /// Subscribe to sign-in/sign-out notifications.
    fn subscribe(&self) -> AuthSubscription;

    /// Password sign-in.
    fn sign_in(&self, email: &str, password: &str) -> Result<Session>;

    /// Account creation. Returns a session when the backend signs the new
    /// account in immediately.
    fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>>;

    /// End the current session.
    fn sign_out(&self) -> Result<()>;

    /// All visible credentials, newest first.
    fn list_credentials(&self) -> Result<Vec<Credential>>;

    /// Insert one credential owned by `user_id`.
    fn insert_credential(&self, user_id: &str, draft: &CredentialDraft) -> Result<()>;

    /// Overwrite every writable column of the credential `id`.
    fn update_credential(&self, id: &str, draft: &CredentialDraft) -> Result<()>;

    /// Delete the credential `id`.
    fn delete_credential(&self, id: &str) -> Result<()>;
}

/// Session holder with auth-state fan-out, shared by backend
/// implementations.
#[derive(Debug, Default)]
pub struct AuthState {
    session: Mutex<Option<Session>>,
    listeners: Mutex<Vec<Sender<AuthEvent>>>,
}

impl AuthState {
    pub fn new(session: Option<Session>) -> Self {
        Self {
            session: Mutex::new(session),
            listeners: Mutex::new(Vec::new()),
        }
    }

    pub fn session(&self) -> Option<Session> {
        lock(&self.session).clone()
    }

    pub fn subscribe(&self) -> AuthSubscription {
        let (tx, rx) = mpsc::channel();
        lock(&self.listeners).push(tx);
        rx
    }

    /// Replace the session and notify subscribers.
    pub fn set_session(&self, session: Option<Session>) {
        *lock(&self.session) = session.clone();
        let event = match session {
            Some(session) => AuthEvent::SignedIn(session),
            None => AuthEvent::SignedOut,
        };
        // Dropped receivers fall out here.
        lock(&self.listeners).retain(|tx| tx.send(event.clone()).is_ok());
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;

    fn session() -> Session {
        Session {
            access_token: "token".into(),
            refresh_token: None,
            expires_at: None,
            user: User {
                id: "user-1".into(),
                email: Some("me@example.com".into()),
            },
        }
    }

    #[test]
    fn subscribers_receive_changes() {
        let state = AuthState::default();
        let rx = state.subscribe();

        state.set_session(Some(session()));
        state.set_session(None);

        assert_eq!(rx.try_recv().unwrap(), AuthEvent::SignedIn(session()));
        assert_eq!(rx.try_recv().unwrap(), AuthEvent::SignedOut);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn dropped_subscription_is_pruned() {
        let state = AuthState::default();
        let rx = state.subscribe();
        drop(rx);

        state.set_session(None);
        assert!(lock(&state.listeners).is_empty());
    }
}
