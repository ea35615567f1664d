//! Keyboard event handling.

use crate::app::{App, AppState, AuthField, InputMode};
use crate::form::FormField;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Handle a key event. Returns true if the app should quit.
pub fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    // Ctrl+C always quits
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return true;
    }

    // Controls are disabled while a request is in flight
    if app.is_busy() {
        return false;
    }

    match (app.state.clone(), app.input_mode.clone()) {
        (AppState::Landing, _) => handle_landing_key(app, key),
        (AppState::Auth, _) => handle_auth_key(app, key),
        (AppState::Dashboard, InputMode::Search) => handle_search_key(app, key),
        (AppState::Dashboard, InputMode::Form) => handle_form_key(app, key),
        (AppState::Dashboard, _) => handle_dashboard_key(app, key),
        (AppState::Quit, _) => true,
    }
}

fn handle_landing_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Enter | KeyCode::Char('g') | KeyCode::Char('s') => {
            app.go_to_auth();
            false
        }
        KeyCode::Char('q') | KeyCode::Esc => {
            app.quit();
            true
        }
        _ => false,
    }
}

fn handle_auth_key(app: &mut App, key: KeyEvent) -> bool {
    let form = &mut app.auth_form;

    // Ctrl+N switches between sign in and sign up
    if key.code == KeyCode::Char('n') && key.modifiers.contains(KeyModifiers::CONTROL) {
        form.sign_up = !form.sign_up;
        return false;
    }

    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Landing;
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
            form.focus = match form.focus {
                AuthField::Email => AuthField::Password,
                AuthField::Password => AuthField::Email,
            };
        }
        KeyCode::Enter => match form.focus {
            AuthField::Email => form.focus = AuthField::Password,
            AuthField::Password => app.request_auth_submit(),
        },
        KeyCode::Char(c) => match form.focus {
            AuthField::Email => form.email.push(c),
            AuthField::Password => form.password.push(c),
        },
        KeyCode::Backspace => {
            match form.focus {
                AuthField::Email => form.email.pop(),
                AuthField::Password => form.password.pop(),
            };
        }
        _ => {}
    }
    false
}

fn handle_dashboard_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') => {
            app.quit();
            return true;
        }
        KeyCode::Char('j') | KeyCode::Down => app.move_down(),
        KeyCode::Char('k') | KeyCode::Up => app.move_up(),
        KeyCode::Char('h') | KeyCode::Left => app.move_selection(-1),
        KeyCode::Char('l') | KeyCode::Right => app.move_selection(1),
        KeyCode::Char('/') => app.start_search(),
        KeyCode::Char('a') => app.open_add_form(),
        KeyCode::Char('e') | KeyCode::Enter => app.open_edit_form(),
        KeyCode::Char('d') | KeyCode::Delete => app.request_delete(),
        KeyCode::Char('v') => app.toggle_reveal(),
        KeyCode::Char('u') => app.copy_username(),
        KeyCode::Char('p') => app.copy_password(),
        KeyCode::Char('w') => app.copy_website(),
        KeyCode::Char('L') => app.request_sign_out(),
        KeyCode::Esc => {
            app.dashboard.search_query.clear();
            app.dashboard.selected_index = 0;
        }
        _ => {}
    }
    false
}

fn handle_search_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc | KeyCode::Enter => app.exit_search(),
        KeyCode::Down => app.move_down(),
        KeyCode::Up => app.move_up(),
        KeyCode::Char(c) => app.search_push(c),
        KeyCode::Backspace => app.search_pop(),
        _ => {}
    }
    false
}

fn handle_form_key(app: &mut App, key: KeyEvent) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    // Ctrl+S submits from any field, Ctrl+G generates a password
    if ctrl {
        match key.code {
            KeyCode::Char('s') => app.request_submit(),
            KeyCode::Char('g') => app.generate_password(),
            _ => {}
        }
        return false;
    }

    if key.code == KeyCode::Esc {
        app.close_form();
        return false;
    }

    if key.code == KeyCode::Enter {
        let in_notes = app.active_form().map(|f| f.focus) == Some(FormField::Notes);
        if !in_notes {
            app.request_submit();
            return false;
        }
    }

    let Some(form) = app.active_form_mut() else {
        return false;
    };

    match (key.code, form.focus) {
        (KeyCode::Tab, _) | (KeyCode::Down, _) => form.next_field(),
        (KeyCode::BackTab, _) | (KeyCode::Up, _) => form.previous_field(),
        (KeyCode::Right, FormField::Category) | (KeyCode::Char(' '), FormField::Category) => {
            form.next_category()
        }
        (KeyCode::Left, FormField::Category) => form.previous_category(),
        (KeyCode::Enter, FormField::Notes) => form.input_char('\n'),
        (KeyCode::Char(c), _) => form.input_char(c),
        (KeyCode::Backspace, _) => form.backspace(),
        _ => {}
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{AppOptions, Modal, Pending};
    use crate::clipboard::testing::RecordingClipboard;
    use crossterm::event::{KeyEventKind, KeyEventState};
    use std::sync::Arc;
    use vaultx_core::{CredentialDraft, MemoryBackend, Operation};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent {
            modifiers: KeyModifiers::CONTROL,
            ..key(KeyCode::Char(c))
        }
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_key(app, key(KeyCode::Char(c)));
        }
    }

    fn settle(app: &mut App) {
        while app.pending.is_some() {
            app.run_pending();
        }
    }

    fn dashboard(backend: Arc<MemoryBackend>) -> App {
        let mut app = App::new(
            backend,
            Box::new(RecordingClipboard::default()),
            AppOptions::default(),
        );
        settle(&mut app);
        app
    }

    #[test]
    fn keys_are_ignored_while_busy() {
        let backend = Arc::new(MemoryBackend::signed_in("alice"));
        let mut app = dashboard(backend);
        app.pending = Some(Pending::MountDashboard);

        assert!(!handle_key(&mut app, key(KeyCode::Char('q'))));
        assert_eq!(app.state, AppState::Dashboard);
        assert!(handle_key(&mut app, ctrl('c')));
    }

    #[test]
    fn add_flow_from_keyboard() {
        let backend = Arc::new(MemoryBackend::signed_in("alice"));
        let mut app = dashboard(backend.clone());

        handle_key(&mut app, key(KeyCode::Char('a')));
        assert_eq!(app.modal, Some(Modal::Add));

        type_text(&mut app, "Gmail");
        handle_key(&mut app, key(KeyCode::Tab));
        handle_key(&mut app, key(KeyCode::Right));
        handle_key(&mut app, key(KeyCode::Tab));
        type_text(&mut app, "mail.google.com");
        handle_key(&mut app, key(KeyCode::Tab));
        type_text(&mut app, "me@gmail.com");
        handle_key(&mut app, ctrl('g'));
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.pending, Some(Pending::SubmitForm));
        settle(&mut app);

        let rows = backend.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "Gmail");
        assert_eq!(rows[0].category(), vaultx_core::Category::Social);
        assert_eq!(rows[0].website(), "mail.google.com");
        assert_eq!(rows[0].password.len(), 16);
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn enter_in_notes_adds_newline() {
        let backend = Arc::new(MemoryBackend::signed_in("alice"));
        let mut app = dashboard(backend.clone());

        handle_key(&mut app, key(KeyCode::Char('a')));
        handle_key(&mut app, key(KeyCode::BackTab));
        type_text(&mut app, "line");
        handle_key(&mut app, key(KeyCode::Enter));
        type_text(&mut app, "two");

        assert_eq!(app.add_form.draft.notes, "line\ntwo");
        assert!(app.pending.is_none());
        assert_eq!(backend.call_count(Operation::Insert), 0);
    }

    #[test]
    fn search_mode_captures_letters() {
        let backend = Arc::new(MemoryBackend::signed_in("alice"));
        backend.seed(
            "alice",
            CredentialDraft {
                title: "Bank".into(),
                username: "me".into(),
                password: "pw".into(),
                ..Default::default()
            },
        );
        let mut app = dashboard(backend);

        handle_key(&mut app, key(KeyCode::Char('/')));
        type_text(&mut app, "dq");
        assert_eq!(app.dashboard.search_query, "dq");
        assert!(app.pending.is_none());
        assert!(app.filtered_credentials().is_empty());

        handle_key(&mut app, key(KeyCode::Esc));
        handle_key(&mut app, key(KeyCode::Esc));
        assert!(app.dashboard.search_query.is_empty());
        assert_eq!(app.filtered_credentials().len(), 1);
    }

    #[test]
    fn landing_to_auth_and_back() {
        let backend = Arc::new(MemoryBackend::new());
        let mut app = dashboard(backend);
        assert_eq!(app.state, AppState::Landing);

        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.state, AppState::Auth);

        type_text(&mut app, "me@example.com");
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.auth_form.focus, AuthField::Password);

        handle_key(&mut app, key(KeyCode::Esc));
        assert_eq!(app.state, AppState::Landing);
    }

    #[test]
    fn ctrl_n_toggles_sign_up() {
        let backend = Arc::new(MemoryBackend::new());
        let mut app = dashboard(backend.clone());
        handle_key(&mut app, key(KeyCode::Char('s')));

        handle_key(&mut app, ctrl('n'));
        type_text(&mut app, "new@example.com");
        handle_key(&mut app, key(KeyCode::Tab));
        type_text(&mut app, "pw");
        handle_key(&mut app, key(KeyCode::Enter));
        settle(&mut app);

        assert_eq!(backend.call_count(Operation::SignUp), 1);
        assert_eq!(app.state, AppState::Dashboard);
    }
}
