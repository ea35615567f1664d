//! Core models and backend client for vaultx.
//!
//! This crate provides the credential types, the backend contract with its
//! REST and in-memory implementations, and the small pure helpers the
//! terminal frontend builds on.

pub mod backend;
pub mod error;
pub mod filter;
pub mod generator;
pub mod memory;
pub mod models;
pub mod rest;

pub use backend::{AuthState, AuthSubscription, Backend};
pub use error::BackendError;
pub use filter::filter_credentials;
pub use generator::{generate_password, PASSWORD_CHARSET, PASSWORD_LENGTH};
pub use memory::{MemoryBackend, Operation};
pub use models::{AuthEvent, Category, Credential, CredentialDraft, Session, User};
pub use rest::{RestBackend, RestConfig};
