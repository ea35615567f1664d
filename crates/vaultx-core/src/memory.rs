//! In-process backend used for demo mode and tests.

use crate::backend::{AuthState, AuthSubscription, Backend};
use crate::error::{BackendError, Result};
use crate::models::{Credential, CredentialDraft, Session, User};
use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;

/// Which remote operation a call was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    GetSession,
    SignIn,
    SignUp,
    SignOut,
    List,
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Default)]
struct Store {
    rows: Vec<Credential>,
    next_id: u64,
    clock: Option<DateTime<Utc>>,
    calls: Vec<Operation>,
    failures: Vec<(Operation, String)>,
}

/// Credentials table and auth kept in memory.
///
/// Any account can sign in with any password. Rows are scoped to the
/// signed-in user the way row-level security scopes them remotely.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    store: Mutex<Store>,
    auth: AuthState,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend that is already signed in as `user_id`.
    pub fn signed_in(user_id: &str) -> Self {
        let backend = Self::new();
        backend.auth.set_session(Some(session_for(user_id, None)));
        backend
    }

    /// Demo vault with a few sample rows.
    pub fn demo() -> Self {
        let backend = Self::signed_in("demo");
        let samples = [
            ("Gmail", "me@gmail.com", "mail.google.com", crate::Category::Social),
            ("Github", "octocat", "https://github.com", crate::Category::Work),
            ("Bank", "customer-1042", "bank.example.com", crate::Category::Finance),
        ];
        for (title, username, website, category) in samples {
            backend.seed(
                "demo",
                CredentialDraft {
                    title: title.into(),
                    username: username.into(),
                    password: crate::generate_password(),
                    website: website.into(),
                    notes: String::new(),
                    category: category.into(),
                },
            );
        }
        backend
    }

    /// Insert a row directly, bypassing call recording and failures.
    pub fn seed(&self, user_id: &str, draft: CredentialDraft) -> Credential {
        let mut store = self.lock();
        let row = store.new_row(user_id, draft);
        store.rows.push(row.clone());
        row
    }

    /// Make the next call of `operation` fail with `message`.
    pub fn fail_next(&self, operation: Operation, message: impl Into<String>) {
        self.lock().failures.push((operation, message.into()));
    }

    /// Operations performed so far, in order.
    pub fn calls(&self) -> Vec<Operation> {
        self.lock().calls.clone()
    }

    /// Number of times `operation` was called.
    pub fn call_count(&self, operation: Operation) -> usize {
        self.lock().calls.iter().filter(|op| **op == operation).count()
    }

    /// Snapshot of every stored row regardless of owner.
    pub fn rows(&self) -> Vec<Credential> {
        self.lock().rows.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record the call and consume a pending failure for it.
    fn begin(&self, operation: Operation) -> Result<()> {
        let mut store = self.lock();
        store.calls.push(operation);
        if let Some(idx) = store.failures.iter().position(|(op, _)| *op == operation) {
            let (_, message) = store.failures.remove(idx);
            return Err(BackendError::Api(message));
        }
        Ok(())
    }

    fn current_user(&self) -> Result<String> {
        self.auth
            .session()
            .map(|s| s.user.id)
            .ok_or(BackendError::NotAuthenticated)
    }
}

impl Store {
    fn new_row(&mut self, user_id: &str, draft: CredentialDraft) -> Credential {
        self.next_id += 1;
        // Strictly increasing timestamps keep ordering deterministic.
        let created_at = match self.clock {
            Some(last) => last + Duration::seconds(1),
            None => Utc::now(),
        };
        self.clock = Some(created_at);

        Credential {
            id: format!("cred-{}", self.next_id),
            user_id: Some(user_id.to_string()),
            title: draft.title,
            username: draft.username,
            password: draft.password,
            website: Some(draft.website),
            notes: Some(draft.notes),
            category: Some(draft.category),
            created_at,
        }
    }
}

fn session_for(user_id: &str, email: Option<&str>) -> Session {
    Session {
        access_token: format!("memory-{}", user_id),
        refresh_token: None,
        expires_at: None,
        user: User {
            id: user_id.to_string(),
            email: email.map(str::to_string),
        },
    }
}

impl Backend for MemoryBackend {
    fn get_session(&self) -> Result<Option<Session>> {
        self.begin(Operation::GetSession)?;
        Ok(self.auth.session())
    }

    fn subscribe(&self) -> AuthSubscription {
        self.auth.subscribe()
    }

    fn sign_in(&self, email: &str, _password: &str) -> Result<Session> {
        self.begin(Operation::SignIn)?;
        let session = session_for(email, Some(email));
        self.auth.set_session(Some(session.clone()));
        Ok(session)
    }

    fn sign_up(&self, email: &str, _password: &str) -> Result<Option<Session>> {
        self.begin(Operation::SignUp)?;
        let session = session_for(email, Some(email));
        self.auth.set_session(Some(session.clone()));
        Ok(Some(session))
    }

    fn sign_out(&self) -> Result<()> {
        self.begin(Operation::SignOut)?;
        self.auth.set_session(None);
        Ok(())
    }

    fn list_credentials(&self) -> Result<Vec<Credential>> {
        self.begin(Operation::List)?;
        let user_id = self.current_user()?;
        let mut rows: Vec<Credential> = self
            .lock()
            .rows
            .iter()
            .filter(|row| row.user_id.as_deref() == Some(user_id.as_str()))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    fn insert_credential(&self, user_id: &str, draft: &CredentialDraft) -> Result<()> {
        self.begin(Operation::Insert)?;
        let mut store = self.lock();
        let row = store.new_row(user_id, draft.clone());
        store.rows.push(row);
        Ok(())
    }

    fn update_credential(&self, id: &str, draft: &CredentialDraft) -> Result<()> {
        self.begin(Operation::Update)?;
        let mut store = self.lock();
        // Matching zero rows is not an error, as with PostgREST.
        if let Some(row) = store.rows.iter_mut().find(|row| row.id == id) {
            row.title = draft.title.clone();
            row.username = draft.username.clone();
            row.password = draft.password.clone();
            row.website = Some(draft.website.clone());
            row.notes = Some(draft.notes.clone());
            row.category = Some(draft.category.clone());
        }
        Ok(())
    }

    fn delete_credential(&self, id: &str) -> Result<()> {
        self.begin(Operation::Delete)?;
        self.lock().rows.retain(|row| row.id != id);
        Ok(())
    }
}
