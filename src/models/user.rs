//! User model. The sync engine only reads users; profile CRUD and OAuth
//! credential issuance live outside this service.

use serde::{Deserialize, Serialize};

/// User profile as stored. Only `id`, `username` and `access_token` are
/// consumed here, for the credential lookup before each sync.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Internal user ID (also used as document ID)
    pub id: String,
    /// GitHub account ID
    pub github_id: String,
    /// GitHub login, used to address the remote API
    pub username: String,
    /// GitHub access token (absent until the user connects their account)
    pub access_token: Option<String>,
}

impl User {
    /// The stored access token, if present and non-empty.
    pub fn credential(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|t| !t.is_empty())
    }
}
