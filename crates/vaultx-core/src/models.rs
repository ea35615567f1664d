//! Shared data types for the application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Grouping tag shown as a badge on each credential.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    #[default]
    General,
    Social,
    Work,
    Finance,
}

impl Category {
    /// Every category, in the order the form cycles through them.
    pub const ALL: [Category; 4] = [
        Category::General,
        Category::Social,
        Category::Work,
        Category::Finance,
    ];

    /// Column value stored by the backend.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::General => "general",
            Category::Social => "social",
            Category::Work => "work",
            Category::Finance => "finance",
        }
    }

    /// Human readable label.
    pub fn label(self) -> &'static str {
        match self {
            Category::General => "General",
            Category::Social => "Social",
            Category::Work => "Work",
            Category::Finance => "Finance",
        }
    }

    /// Parse a stored value. Anything unrecognised is `General`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "social" => Category::Social,
            "work" => Category::Work,
            "finance" => Category::Finance,
            _ => Category::General,
        }
    }

    /// The category after this one, wrapping around.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// The category before this one, wrapping around.
    pub fn previous(self) -> Self {
        let idx = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        Category::parse(&value)
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored credential row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub title: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Stored column value. May hold a value outside [`Category`].
    #[serde(default)]
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Credential {
    /// Category with the default applied.
    pub fn category(&self) -> Category {
        self.category
            .as_deref()
            .map(Category::parse)
            .unwrap_or_default()
    }

    /// Website or an empty string.
    pub fn website(&self) -> &str {
        self.website.as_deref().unwrap_or_default()
    }

    /// Notes or an empty string.
    pub fn notes(&self) -> &str {
        self.notes.as_deref().unwrap_or_default()
    }

    /// Website as a navigable link; bare hosts get an `https://` prefix.
    pub fn website_href(&self) -> Option<String> {
        let website = self.website();
        if website.is_empty() {
            None
        } else if website.starts_with("http") {
            Some(website.to_string())
        } else {
            Some(format!("https://{}", website))
        }
    }
}

/// The writable column set of a credential.
///
/// Sent as-is on update (the whole record is overwritten) and together
/// with the owner's id on insert. `category` is the raw column value so
/// an edit writes back what it read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialDraft {
    pub title: String,
    pub username: String,
    pub password: String,
    pub website: String,
    pub notes: String,
    pub category: String,
}

impl Default for CredentialDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            username: String::new(),
            password: String::new(),
            website: String::new(),
            notes: String::new(),
            category: Category::General.into(),
        }
    }
}

impl CredentialDraft {
    /// Seed a draft from an existing credential.
    pub fn from_credential(credential: &Credential) -> Self {
        Self {
            title: credential.title.clone(),
            username: credential.username.clone(),
            password: credential.password.clone(),
            website: credential.website().to_string(),
            notes: credential.notes().to_string(),
            category: credential
                .category
                .clone()
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| Category::General.into()),
        }
    }

    /// The draft's category as shown in the form.
    pub fn category(&self) -> Category {
        Category::parse(&self.category)
    }

    pub fn set_category(&mut self, category: Category) {
        self.category = category.into();
    }

    /// Name of the first required field that is empty, if any.
    pub fn missing_required(&self) -> Option<&'static str> {
        if self.title.is_empty() {
            Some("Title")
        } else if self.username.is_empty() {
            Some("Username")
        } else if self.password.is_empty() {
            Some("Password")
        } else {
            None
        }
    }
}

/// Insert payload: a draft plus its owner.
#[derive(Debug, Clone, Serialize)]
pub struct NewCredential<'a> {
    pub user_id: &'a str,
    #[serde(flatten)]
    pub draft: &'a CredentialDraft,
}

/// The authenticated account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Authenticated-user context issued by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Unix timestamp (seconds) after which the access token is rejected.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: User,
}

impl Session {
    /// Whether the access token has passed its expiry.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .map(|at| at <= now.timestamp())
            .unwrap_or(false)
    }
}

/// Auth-state change notification.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    SignedIn(Session),
    SignedOut,
}

impl AuthEvent {
    /// The session carried by the event, if any.
    pub fn session(&self) -> Option<&Session> {
        match self {
            AuthEvent::SignedIn(session) => Some(session),
            AuthEvent::SignedOut => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(json: &str) -> Credential {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn nullable_columns_default() {
        let c = row(
            r#"{"id":"1","title":"Gmail","username":"me","password":"pw",
                "website":null,"notes":null,"category":null,
                "created_at":"2024-03-01T10:00:00+00:00"}"#,
        );
        assert_eq!(c.category(), Category::General);
        assert_eq!(c.website(), "");
        assert_eq!(c.notes(), "");
        assert!(c.website_href().is_none());
    }

    #[test]
    fn unknown_category_reads_as_general() {
        let c = row(
            r#"{"id":"1","title":"t","username":"u","password":"p",
                "category":"gaming","created_at":"2024-03-01T10:00:00Z"}"#,
        );
        assert_eq!(c.category(), Category::General);
    }

    #[test]
    fn unknown_category_survives_an_edit() {
        let c = row(
            r#"{"id":"1","title":"t","username":"u","password":"p",
                "category":"gaming","created_at":"2024-03-01T10:00:00Z"}"#,
        );
        let draft = CredentialDraft::from_credential(&c);
        assert_eq!(draft.category(), Category::General);

        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value["category"], "gaming");
    }

    #[test]
    fn missing_category_is_written_as_general() {
        let c = row(
            r#"{"id":"1","title":"t","username":"u","password":"p",
                "category":"","created_at":"2024-03-01T10:00:00Z"}"#,
        );
        assert_eq!(CredentialDraft::from_credential(&c).category, "general");
        assert_eq!(CredentialDraft::default().category, "general");
    }

    #[test]
    fn category_serializes_lowercase() {
        let json = serde_json::to_string(&Category::Finance).unwrap();
        assert_eq!(json, "\"finance\"");
    }

    #[test]
    fn category_cycles() {
        assert_eq!(Category::Finance.next(), Category::General);
        assert_eq!(Category::General.previous(), Category::Finance);
    }

    #[test]
    fn website_href_adds_scheme() {
        let mut c = row(
            r#"{"id":"1","title":"t","username":"u","password":"p",
                "website":"mail.google.com","created_at":"2024-03-01T10:00:00Z"}"#,
        );
        assert_eq!(c.website_href().as_deref(), Some("https://mail.google.com"));
        c.website = Some("http://example.com".into());
        assert_eq!(c.website_href().as_deref(), Some("http://example.com"));
    }

    #[test]
    fn insert_payload_is_flat() {
        let draft = CredentialDraft {
            title: "Bank".into(),
            username: "me".into(),
            password: "pw".into(),
            category: Category::Finance.into(),
            ..Default::default()
        };
        let value = serde_json::to_value(NewCredential {
            user_id: "u-1",
            draft: &draft,
        })
        .unwrap();
        assert_eq!(value["user_id"], "u-1");
        assert_eq!(value["title"], "Bank");
        assert_eq!(value["category"], "finance");
        assert_eq!(value["website"], "");
    }

    #[test]
    fn missing_required_reports_first_empty_field() {
        let mut draft = CredentialDraft::default();
        assert_eq!(draft.missing_required(), Some("Title"));
        draft.title = "t".into();
        assert_eq!(draft.missing_required(), Some("Username"));
        draft.username = "u".into();
        assert_eq!(draft.missing_required(), Some("Password"));
        draft.password = "p".into();
        assert_eq!(draft.missing_required(), None);
    }

    #[test]
    fn session_expiry() {
        let session = Session {
            access_token: "a".into(),
            refresh_token: None,
            expires_at: Some(100),
            user: User {
                id: "u".into(),
                email: None,
            },
        };
        let now = DateTime::from_timestamp(200, 0).unwrap();
        assert!(session.is_expired(now));
    }
}
