//! REST client for a Supabase-style backend.
//!
//! Table rows go through PostgREST under `/rest/v1`, auth through GoTrue
//! under `/auth/v1`.

use crate::backend::{AuthState, AuthSubscription, Backend};
use crate::error::{BackendError, Result};
use crate::models::{Credential, CredentialDraft, NewCredential, Session};
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use url::Url;

const TABLE: &str = "credentials";

/// Connection settings for [`RestBackend`].
#[derive(Debug, Clone)]
pub struct RestConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`.
    pub base_url: String,
    /// Public (anon) API key.
    pub anon_key: String,
    /// Where to keep the session between runs. `None` keeps it in memory.
    pub session_file: Option<PathBuf>,
}

impl RestConfig {
    /// Default on-disk session location.
    pub fn default_session_file() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("vaultx").join("session.json"))
    }
}

/// Backend implementation over HTTPS.
pub struct RestBackend {
    client: Client,
    base_url: Url,
    anon_key: String,
    session_file: Option<PathBuf>,
    auth: AuthState,
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshGrant<'a> {
    refresh_token: &'a str,
}

impl RestBackend {
    /// Build a client and restore any persisted session.
    pub fn new(config: RestConfig) -> Result<Self> {
        let mut base_url = Url::parse(&config.base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .user_agent(concat!("vaultx/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let session = config
            .session_file
            .as_ref()
            .and_then(|path| load_session(path));

        if session.is_some() {
            tracing::debug!("Restored persisted session");
        }

        Ok(Self {
            client,
            base_url,
            anon_key: config.anon_key,
            session_file: config.session_file,
            auth: AuthState::new(session),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    fn table_url(&self) -> Result<Url> {
        self.endpoint(&format!("rest/v1/{}", TABLE))
    }

    fn row_url(&self, id: &str) -> Result<Url> {
        let mut url = self.table_url()?;
        url.query_pairs_mut().append_pair("id", &format!("eq.{}", id));
        Ok(url)
    }

    /// Attach the API key and the bearer token (session or anon).
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let bearer = self
            .auth
            .session()
            .map(|s| s.access_token)
            .unwrap_or_else(|| self.anon_key.clone());
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    fn store_session(&self, session: Option<Session>) {
        if let Some(path) = &self.session_file {
            let outcome = match &session {
                Some(session) => save_session(path, session),
                None => match fs::remove_file(path) {
                    Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
                    _ => Ok(()),
                },
            };
            if let Err(e) = outcome {
                tracing::warn!("Failed to persist session to {}: {}", path.display(), e);
            }
        }
        self.auth.set_session(session);
    }

    fn refresh(&self, refresh_token: &str) -> Result<Session> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "refresh_token");
        let response = self
            .client
            .post(url)
            .header("apikey", &self.anon_key)
            .json(&RefreshGrant { refresh_token })
            .send()?;
        Ok(check(response)?.json()?)
    }
}

impl Backend for RestBackend {
    fn get_session(&self) -> Result<Option<Session>> {
        let Some(session) = self.auth.session() else {
            return Ok(None);
        };

        if !session.is_expired(chrono::Utc::now()) {
            return Ok(Some(session));
        }

        tracing::debug!("Access token expired, refreshing");
        let Some(refresh_token) = session.refresh_token.as_deref() else {
            self.store_session(None);
            return Ok(None);
        };

        match self.refresh(refresh_token) {
            Ok(fresh) => {
                self.store_session(Some(fresh.clone()));
                Ok(Some(fresh))
            }
            Err(BackendError::Api(message)) => {
                tracing::info!("Session refresh rejected: {}", message);
                self.store_session(None);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn subscribe(&self) -> AuthSubscription {
        self.auth.subscribe()
    }

    fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");
        let response = self
            .client
            .post(url)
            .header("apikey", &self.anon_key)
            .json(&PasswordGrant { email, password })
            .send()?;
        let session: Session = check(response)?.json()?;
        tracing::info!("Signed in as {}", session.user.id);
        self.store_session(Some(session.clone()));
        Ok(session)
    }

    fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>> {
        let url = self.endpoint("auth/v1/signup")?;
        let response = self
            .client
            .post(url)
            .header("apikey", &self.anon_key)
            .json(&PasswordGrant { email, password })
            .send()?;
        let body: Value = check(response)?.json()?;

        // Without email confirmation the backend answers with a session,
        // otherwise with the bare user.
        if body.get("access_token").is_some() {
            let session: Session = serde_json::from_value(body)?;
            self.store_session(Some(session.clone()));
            Ok(Some(session))
        } else {
            Ok(None)
        }
    }

    fn sign_out(&self) -> Result<()> {
        if self.auth.session().is_some() {
            let url = self.endpoint("auth/v1/logout")?;
            let outcome = self
                .authorize(self.client.post(url))
                .send()
                .map_err(BackendError::from)
                .and_then(check);
            if let Err(e) = outcome {
                // The local session goes away regardless.
                tracing::warn!("Remote sign-out failed: {}", e);
            }
        }
        self.store_session(None);
        Ok(())
    }

    fn list_credentials(&self) -> Result<Vec<Credential>> {
        let mut url = self.table_url()?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("order", "created_at.desc");
        let response = self.authorize(self.client.get(url)).send()?;
        let rows: Vec<Credential> = check(response)?.json()?;
        tracing::debug!("Fetched {} credentials", rows.len());
        Ok(rows)
    }

    fn insert_credential(&self, user_id: &str, draft: &CredentialDraft) -> Result<()> {
        let response = self
            .authorize(self.client.post(self.table_url()?))
            .header("Prefer", "return=minimal")
            .json(&NewCredential { user_id, draft })
            .send()?;
        check(response)?;
        Ok(())
    }

    fn update_credential(&self, id: &str, draft: &CredentialDraft) -> Result<()> {
        let response = self
            .authorize(self.client.patch(self.row_url(id)?))
            .header("Prefer", "return=minimal")
            .json(draft)
            .send()?;
        check(response)?;
        Ok(())
    }

    fn delete_credential(&self, id: &str) -> Result<()> {
        let response = self
            .authorize(self.client.delete(self.row_url(id)?))
            .send()?;
        check(response)?;
        Ok(())
    }
}

/// Turn a non-success response into [`BackendError::Api`].
fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    let message = error_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| status.to_string())
    });
    tracing::debug!("Backend returned {}: {}", status, message);
    Err(BackendError::Api(message))
}

/// Pull the human readable message out of a PostgREST or GoTrue error body.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "msg", "error_description", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

fn load_session(path: &Path) -> Option<Session> {
    let contents = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&contents) {
        Ok(session) => Some(session),
        Err(e) => {
            tracing::warn!("Ignoring unreadable session file {}: {}", path.display(), e);
            None
        }
    }
}

/// Write the session readable by the owner only; it holds bearer tokens.
fn save_session(path: &Path, session: &Session) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_private_dir(parent)?;
    }

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;

    // `mode` only applies on creation; tighten files left by older runs.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }

    file.write_all(&serde_json::to_vec(session)?)?;
    Ok(())
}

fn create_private_dir(dir: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        fs::DirBuilder::new().recursive(true).mode(0o700).create(dir)?;
    }
    #[cfg(not(unix))]
    fs::create_dir_all(dir)?;
    Ok(())
}
