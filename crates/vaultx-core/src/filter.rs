//! Client-side credential filtering.

use crate::models::Credential;

/// Whether `credential` matches `query`: a case-insensitive substring of
/// its title, website or username. An empty query matches everything.
pub fn matches(credential: &Credential, query: &str) -> bool {
    let needle = query.to_lowercase();
    credential.title.to_lowercase().contains(&needle)
        || credential.website().to_lowercase().contains(&needle)
        || credential.username.to_lowercase().contains(&needle)
}

/// The credentials matching `query`, in their original order.
pub fn filter_credentials<'a>(credentials: &'a [Credential], query: &str) -> Vec<&'a Credential> {
    credentials.iter().filter(|c| matches(c, query)).collect()
}
