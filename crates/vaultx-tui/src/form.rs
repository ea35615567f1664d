//! Add/edit credential form state.

use vaultx_core::{generate_password, Credential, CredentialDraft};

/// Which flow the form submits to.
#[derive(Debug, Clone, PartialEq)]
pub enum FormMode {
    Add,
    /// Editing the credential with this id.
    Edit { id: String },
}

/// Form fields in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Category,
    Website,
    Username,
    Password,
    Notes,
}

impl FormField {
    const ORDER: [FormField; 6] = [
        FormField::Title,
        FormField::Category,
        FormField::Website,
        FormField::Username,
        FormField::Password,
        FormField::Notes,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormField::Title => "Title *",
            FormField::Category => "Category",
            FormField::Website => "Website",
            FormField::Username => "Username *",
            FormField::Password => "Password *",
            FormField::Notes => "Notes",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            FormField::Title => "e.g., Gmail Account",
            FormField::Category => "",
            FormField::Website => "https://example.com",
            FormField::Username => "username or email",
            FormField::Password => "Enter or generate password",
            FormField::Notes => "Additional notes...",
        }
    }

    pub fn all() -> &'static [FormField] {
        &Self::ORDER
    }

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }
}

/// Modal form mirroring a credential's writable fields.
#[derive(Debug, Clone)]
pub struct CredentialForm {
    pub mode: FormMode,
    pub draft: CredentialDraft,
    pub focus: FormField,
    /// A request is in flight; submission is disabled.
    pub saving: bool,
    /// Required-field message shown instead of submitting.
    pub validation: Option<String>,
}

impl CredentialForm {
    /// Empty add form.
    pub fn add() -> Self {
        Self {
            mode: FormMode::Add,
            draft: CredentialDraft::default(),
            focus: FormField::Title,
            saving: false,
            validation: None,
        }
    }

    /// Edit form seeded from `credential`.
    pub fn edit(credential: &Credential) -> Self {
        Self {
            mode: FormMode::Edit {
                id: credential.id.clone(),
            },
            draft: CredentialDraft::from_credential(credential),
            focus: FormField::Title,
            saving: false,
            validation: None,
        }
    }

    pub fn is_edit(&self) -> bool {
        matches!(self.mode, FormMode::Edit { .. })
    }

    pub fn heading(&self) -> &'static str {
        if self.is_edit() {
            "Edit Credential"
        } else {
            "Add New Credential"
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match (self.is_edit(), self.saving) {
            (false, false) => "Save Credential",
            (false, true) => "Saving...",
            (true, false) => "Update Credential",
            (true, true) => "Updating...",
        }
    }

    /// Back to empty defaults.
    pub fn reset(&mut self) {
        self.draft = CredentialDraft::default();
        self.focus = FormField::Title;
        self.validation = None;
    }

    pub fn next_field(&mut self) {
        let all = FormField::all();
        self.focus = all[(self.focus.index() + 1) % all.len()];
    }

    pub fn previous_field(&mut self) {
        let all = FormField::all();
        self.focus = all[(self.focus.index() + all.len() - 1) % all.len()];
    }

    /// Text shown for `field`.
    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Title => &self.draft.title,
            FormField::Category => self.draft.category().label(),
            FormField::Website => &self.draft.website,
            FormField::Username => &self.draft.username,
            FormField::Password => &self.draft.password,
            FormField::Notes => &self.draft.notes,
        }
    }

    fn text_mut(&mut self, field: FormField) -> Option<&mut String> {
        match field {
            FormField::Title => Some(&mut self.draft.title),
            FormField::Category => None,
            FormField::Website => Some(&mut self.draft.website),
            FormField::Username => Some(&mut self.draft.username),
            FormField::Password => Some(&mut self.draft.password),
            FormField::Notes => Some(&mut self.draft.notes),
        }
    }

    pub fn input_char(&mut self, c: char) {
        if let Some(text) = self.text_mut(self.focus) {
            text.push(c);
            self.validation = None;
        }
    }

    pub fn backspace(&mut self) {
        if let Some(text) = self.text_mut(self.focus) {
            text.pop();
        }
    }

    pub fn next_category(&mut self) {
        let next = self.draft.category().next();
        self.draft.set_category(next);
    }

    pub fn previous_category(&mut self) {
        let previous = self.draft.category().previous();
        self.draft.set_category(previous);
    }

    /// Replace the password with a freshly generated one.
    pub fn generate_password(&mut self) {
        self.draft.password = generate_password();
        self.validation = None;
    }

    /// Check required fields. On failure focus moves to the offending
    /// field and the message is kept for display.
    pub fn validate(&mut self) -> bool {
        let missing = match self.draft.missing_required() {
            Some(name) => name,
            None => {
                self.validation = None;
                return true;
            }
        };
        self.focus = match missing {
            "Title" => FormField::Title,
            "Username" => FormField::Username,
            _ => FormField::Password,
        };
        self.validation = Some(format!("{} is required", missing));
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use vaultx_core::{Category, PASSWORD_CHARSET, PASSWORD_LENGTH};

    fn credential() -> Credential {
        Credential {
            id: "cred-9".into(),
            user_id: Some("u".into()),
            title: "Gmail".into(),
            username: "me@gmail.com".into(),
            password: "pw".into(),
            website: None,
            notes: None,
            category: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn edit_prefills_with_defaults() {
        let form = CredentialForm::edit(&credential());
        assert_eq!(form.mode, FormMode::Edit { id: "cred-9".into() });
        assert_eq!(form.draft.title, "Gmail");
        assert_eq!(form.draft.username, "me@gmail.com");
        assert_eq!(form.draft.password, "pw");
        assert_eq!(form.draft.website, "");
        assert_eq!(form.draft.notes, "");
        assert_eq!(form.draft.category(), Category::General);
    }

    #[test]
    fn typing_goes_to_focused_field() {
        let mut form = CredentialForm::add();
        for c in "Bank".chars() {
            form.input_char(c);
        }
        form.next_field();
        form.input_char('x');
        form.next_category();
        form.next_field();
        form.input_char('w');

        assert_eq!(form.draft.title, "Bank");
        assert_eq!(form.draft.category(), Category::Social);
        assert_eq!(form.draft.website, "w");
    }

    #[test]
    fn focus_wraps_both_ways() {
        let mut form = CredentialForm::add();
        form.previous_field();
        assert_eq!(form.focus, FormField::Notes);
        form.next_field();
        assert_eq!(form.focus, FormField::Title);
    }

    #[test]
    fn validate_points_at_missing_field() {
        let mut form = CredentialForm::add();
        form.draft.title = "t".into();
        form.draft.username = "u".into();

        assert!(!form.validate());
        assert_eq!(form.focus, FormField::Password);
        assert_eq!(form.validation.as_deref(), Some("Password is required"));

        form.generate_password();
        assert!(form.validate());
        assert!(form.validation.is_none());
    }

    #[test]
    fn generated_password_fills_field() {
        let mut form = CredentialForm::add();
        form.generate_password();
        assert_eq!(form.draft.password.len(), PASSWORD_LENGTH);
        assert!(form.draft.password.chars().all(|c| PASSWORD_CHARSET.contains(c)));
    }

    #[test]
    fn submit_label_tracks_mode_and_saving() {
        let mut form = CredentialForm::edit(&credential());
        assert_eq!(form.submit_label(), "Update Credential");
        form.saving = true;
        assert_eq!(form.submit_label(), "Updating...");
        assert_eq!(CredentialForm::add().submit_label(), "Save Credential");
    }
}
