//! Application state management.

use crate::clipboard::Clipboard;
use crate::form::{CredentialForm, FormMode};
use crate::toast::Toasts;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use vaultx_core::{
    filter_credentials, AuthEvent, AuthSubscription, Backend, Credential, User,
};

/// Which screen is showing.
#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    /// Marketing page with sign-in links.
    Landing,
    /// Email/password sign-in.
    Auth,
    /// Credential grid.
    Dashboard,
    /// Application should quit.
    Quit,
}

/// Input mode for the application.
#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    /// Normal navigation mode.
    Normal,
    /// Typing into the dashboard search box.
    Search,
    /// Add/edit modal is open.
    Form,
    /// Typing into the sign-in form.
    SignIn,
}

/// Dashboard data status.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardStatus {
    Loading,
    Ready,
}

/// A remote call queued by a key press.
///
/// The main loop draws the in-flight state, then runs it; key input is
/// ignored until it completes.
#[derive(Debug, Clone, PartialEq)]
pub enum Pending {
    /// Landing page session probe.
    LandingSessionCheck,
    /// Dashboard mount: session check, then fetch.
    MountDashboard,
    Delete(String),
    SubmitForm,
    SignIn,
    SignUp,
    SignOut,
}

/// Which modal is open over the dashboard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Modal {
    Add,
    Edit,
}

/// Sign-in form fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AuthField {
    Email,
    Password,
}

/// Sign-in screen state.
#[derive(Debug, Clone)]
pub struct AuthForm {
    pub email: String,
    pub password: String,
    pub focus: AuthField,
    /// Create an account instead of signing in.
    pub sign_up: bool,
}

impl Default for AuthForm {
    fn default() -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            focus: AuthField::Email,
            sign_up: false,
        }
    }
}

/// Dashboard state.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub status: DashboardStatus,
    pub user: Option<User>,
    /// Everything fetched, newest first.
    pub credentials: Vec<Credential>,
    pub search_query: String,
    /// Index into the filtered list.
    pub selected_index: usize,
    /// Cards whose password is currently revealed.
    pub revealed: HashSet<String>,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self {
            status: DashboardStatus::Loading,
            user: None,
            credentials: Vec::new(),
            search_query: String::new(),
            selected_index: 0,
            revealed: HashSet::new(),
        }
    }
}

/// Startup options taken from the configuration.
#[derive(Debug, Clone)]
pub struct AppOptions {
    pub toast_duration: Duration,
    pub reveal_by_default: bool,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            toast_duration: Duration::from_secs(4),
            reveal_by_default: false,
        }
    }
}

/// Main application model.
pub struct App {
    /// Current screen.
    pub state: AppState,
    /// Current input mode.
    pub input_mode: InputMode,
    /// Remote call waiting to run.
    pub pending: Option<Pending>,
    pub toasts: Toasts,
    pub dashboard: Dashboard,
    pub auth_form: AuthForm,
    pub add_form: CredentialForm,
    pub edit_form: Option<CredentialForm>,
    pub modal: Option<Modal>,
    /// Cards per row in the grid; set from the terminal width.
    pub grid_columns: usize,
    backend: Arc<dyn Backend>,
    clipboard: Box<dyn Clipboard>,
    subscription: Option<AuthSubscription>,
    reveal_by_default: bool,
}

impl App {
    /// Create a new application instance on the landing page.
    pub fn new(
        backend: Arc<dyn Backend>,
        clipboard: Box<dyn Clipboard>,
        options: AppOptions,
    ) -> Self {
        Self {
            state: AppState::Landing,
            input_mode: InputMode::Normal,
            pending: Some(Pending::LandingSessionCheck),
            toasts: Toasts::new(options.toast_duration),
            dashboard: Dashboard::default(),
            auth_form: AuthForm::default(),
            add_form: CredentialForm::add(),
            edit_form: None,
            modal: None,
            grid_columns: 1,
            backend,
            clipboard,
            subscription: None,
            reveal_by_default: options.reveal_by_default,
        }
    }

    /// Per-frame housekeeping: expire notifications and react to
    /// auth-state changes.
    pub fn tick(&mut self) {
        self.toasts.expire(Instant::now());
        self.poll_auth_events();
    }

    /// Whether key input is currently ignored.
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Run the queued remote call, if any.
    pub fn run_pending(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        tracing::debug!("Running {:?}", pending);

        match pending {
            Pending::LandingSessionCheck => self.check_landing_session(),
            Pending::MountDashboard => self.mount_dashboard(),
            Pending::Delete(id) => self.delete_credential(&id),
            Pending::SubmitForm => self.submit_form(),
            Pending::SignIn => self.sign_in(),
            Pending::SignUp => self.sign_up(),
            Pending::SignOut => self.sign_out(),
        }
    }

    // Navigation

    /// Go to the sign-in screen.
    pub fn go_to_auth(&mut self) {
        self.subscription = None;
        self.state = AppState::Auth;
        self.input_mode = InputMode::SignIn;
        self.modal = None;
        self.edit_form = None;
        self.auth_form.password.clear();
        self.dashboard = Dashboard::default();
    }

    /// Open the dashboard and queue its mount sequence.
    pub fn open_dashboard(&mut self) {
        self.state = AppState::Dashboard;
        self.input_mode = InputMode::Normal;
        self.dashboard = Dashboard::default();
        self.subscription = Some(self.backend.subscribe());
        self.pending = Some(Pending::MountDashboard);
    }

    pub fn quit(&mut self) {
        self.state = AppState::Quit;
    }

    fn check_landing_session(&mut self) {
        match self.backend.get_session() {
            Ok(Some(_)) => self.open_dashboard(),
            Ok(None) => {}
            Err(e) => tracing::debug!("Landing session check failed: {}", e),
        }
    }

    fn mount_dashboard(&mut self) {
        match self.backend.get_session() {
            Ok(Some(session)) => {
                self.dashboard.user = Some(session.user);
                self.fetch_credentials();
            }
            Ok(None) => self.go_to_auth(),
            Err(e) => {
                tracing::warn!("Session check failed: {}", e);
                self.go_to_auth();
            }
        }
    }

    fn poll_auth_events(&mut self) {
        let mut signed_out = false;
        if let Some(rx) = &self.subscription {
            while let Ok(event) = rx.try_recv() {
                match event {
                    AuthEvent::SignedIn(session) => self.dashboard.user = Some(session.user),
                    AuthEvent::SignedOut => signed_out = true,
                }
            }
        }
        if signed_out && self.state == AppState::Dashboard {
            tracing::info!("Session ended, redirecting to sign-in");
            self.go_to_auth();
        }
    }

    // Dashboard

    /// Refetch the full list. Failures keep the current list.
    pub fn fetch_credentials(&mut self) {
        match self.backend.list_credentials() {
            Ok(rows) => {
                self.dashboard.credentials = rows;
                self.clamp_selection();
            }
            Err(e) => self.toasts.error("Error fetching credentials", e.to_string()),
        }
        self.dashboard.status = DashboardStatus::Ready;
    }

    /// Credentials matching the search box.
    pub fn filtered_credentials(&self) -> Vec<&Credential> {
        filter_credentials(&self.dashboard.credentials, &self.dashboard.search_query)
    }

    pub fn selected_credential(&self) -> Option<&Credential> {
        self.filtered_credentials()
            .get(self.dashboard.selected_index)
            .copied()
    }

    fn clamp_selection(&mut self) {
        let len = self.filtered_credentials().len();
        if self.dashboard.selected_index >= len {
            self.dashboard.selected_index = len.saturating_sub(1);
        }
    }

    /// Move the selection by `delta` cards, staying in bounds.
    pub fn move_selection(&mut self, delta: isize) {
        let len = self.filtered_credentials().len();
        if len == 0 {
            return;
        }
        let current = self.dashboard.selected_index as isize;
        self.dashboard.selected_index = (current + delta).clamp(0, len as isize - 1) as usize;
    }

    pub fn move_up(&mut self) {
        self.move_selection(-(self.grid_columns.max(1) as isize));
    }

    pub fn move_down(&mut self) {
        self.move_selection(self.grid_columns.max(1) as isize);
    }

    pub fn start_search(&mut self) {
        self.input_mode = InputMode::Search;
    }

    pub fn exit_search(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn search_push(&mut self, c: char) {
        self.dashboard.search_query.push(c);
        self.dashboard.selected_index = 0;
    }

    pub fn search_pop(&mut self) {
        self.dashboard.search_query.pop();
        self.dashboard.selected_index = 0;
    }

    /// Queue deletion of the selected card.
    pub fn request_delete(&mut self) {
        if let Some(id) = self.selected_credential().map(|c| c.id.clone()) {
            self.pending = Some(Pending::Delete(id));
        }
    }

    fn delete_credential(&mut self, id: &str) {
        match self.backend.delete_credential(id) {
            Ok(()) => {
                tracing::info!("Deleted credential {}", id);
                self.dashboard.revealed.remove(id);
                self.toasts
                    .info("Credential deleted", "The credential has been removed.");
                self.fetch_credentials();
            }
            Err(e) => self.toasts.error("Error deleting credential", e.to_string()),
        }
    }

    pub fn request_sign_out(&mut self) {
        self.pending = Some(Pending::SignOut);
    }

    fn sign_out(&mut self) {
        if let Err(e) = self.backend.sign_out() {
            tracing::warn!("Sign-out failed: {}", e);
        }
        self.go_to_auth();
    }

    // Credential card

    /// Whether the card's password is shown in clear.
    pub fn is_revealed(&self, id: &str) -> bool {
        self.reveal_by_default != self.dashboard.revealed.contains(id)
    }

    pub fn toggle_reveal(&mut self) {
        let Some(id) = self.selected_credential().map(|c| c.id.clone()) else {
            return;
        };
        if !self.dashboard.revealed.remove(&id) {
            self.dashboard.revealed.insert(id);
        }
    }

    pub fn copy_username(&mut self) {
        if let Some(value) = self.selected_credential().map(|c| c.username.clone()) {
            self.copy_to_clipboard(&value, "Username");
        }
    }

    pub fn copy_password(&mut self) {
        if let Some(value) = self.selected_credential().map(|c| c.password.clone()) {
            self.copy_to_clipboard(&value, "Password");
        }
    }

    /// Copy the website as a navigable link.
    pub fn copy_website(&mut self) {
        if let Some(href) = self.selected_credential().and_then(|c| c.website_href()) {
            self.copy_to_clipboard(&href, "Link");
        }
    }

    fn copy_to_clipboard(&mut self, text: &str, kind: &str) {
        if let Err(e) = self.clipboard.set_text(text) {
            tracing::debug!("Clipboard write failed: {}", e);
        }
        self.toasts
            .info("Copied!", format!("{} copied to clipboard", kind));
    }

    // Modals

    pub fn open_add_form(&mut self) {
        self.modal = Some(Modal::Add);
        self.input_mode = InputMode::Form;
    }

    /// Open the edit modal for the selected card, re-seeded from it.
    pub fn open_edit_form(&mut self) {
        let Some(form) = self.selected_credential().map(CredentialForm::edit) else {
            return;
        };
        self.edit_form = Some(form);
        self.modal = Some(Modal::Edit);
        self.input_mode = InputMode::Form;
    }

    pub fn close_form(&mut self) {
        self.modal = None;
        self.edit_form = None;
        self.input_mode = InputMode::Normal;
    }

    /// The form of the open modal.
    pub fn active_form(&self) -> Option<&CredentialForm> {
        match self.modal? {
            Modal::Add => Some(&self.add_form),
            Modal::Edit => self.edit_form.as_ref(),
        }
    }

    pub fn active_form_mut(&mut self) -> Option<&mut CredentialForm> {
        match self.modal? {
            Modal::Add => Some(&mut self.add_form),
            Modal::Edit => self.edit_form.as_mut(),
        }
    }

    pub fn generate_password(&mut self) {
        if let Some(form) = self.active_form_mut() {
            form.generate_password();
            self.toasts.info(
                "Password generated!",
                "A secure password has been created for you.",
            );
        }
    }

    /// Queue submission unless a required field is empty.
    pub fn request_submit(&mut self) {
        let Some(form) = self.active_form_mut() else {
            return;
        };
        if form.saving || !form.validate() {
            return;
        }
        form.saving = true;
        self.pending = Some(Pending::SubmitForm);
    }

    fn submit_form(&mut self) {
        let Some(form) = self.active_form().cloned() else {
            return;
        };

        let outcome = match &form.mode {
            FormMode::Add => self
                .backend
                .get_session()
                .and_then(|s| s.ok_or(vaultx_core::BackendError::NotAuthenticated))
                .and_then(|s| self.backend.insert_credential(&s.user.id, &form.draft)),
            FormMode::Edit { id } => self.backend.update_credential(id, &form.draft),
        };

        if let Some(form) = self.active_form_mut() {
            form.saving = false;
        }

        match outcome {
            Ok(()) => {
                if form.is_edit() {
                    self.toasts
                        .info("Credential updated!", "Your changes have been saved.");
                } else {
                    tracing::info!("Credential added");
                    self.toasts.info(
                        "Credential added!",
                        "Your credential has been securely saved.",
                    );
                    self.add_form.reset();
                }
                self.close_form();
                self.fetch_credentials();
            }
            Err(e) => self.toasts.error("Error", e.to_string()),
        }
    }

    // Sign-in

    pub fn request_auth_submit(&mut self) {
        if self.auth_form.email.is_empty() || self.auth_form.password.is_empty() {
            return;
        }
        self.pending = Some(if self.auth_form.sign_up {
            Pending::SignUp
        } else {
            Pending::SignIn
        });
    }

    fn sign_in(&mut self) {
        match self
            .backend
            .sign_in(&self.auth_form.email, &self.auth_form.password)
        {
            Ok(_) => {
                self.auth_form.password.clear();
                self.open_dashboard();
            }
            Err(e) => self.toasts.error("Sign in failed", e.to_string()),
        }
    }

    fn sign_up(&mut self) {
        match self
            .backend
            .sign_up(&self.auth_form.email, &self.auth_form.password)
        {
            Ok(Some(_)) => {
                self.auth_form.password.clear();
                self.open_dashboard();
            }
            Ok(None) => {
                self.auth_form.sign_up = false;
                self.toasts.info(
                    "Check your email",
                    "Confirm your account, then sign in.",
                );
            }
            Err(e) => self.toasts.error("Sign up failed", e.to_string()),
        }
    }
}
