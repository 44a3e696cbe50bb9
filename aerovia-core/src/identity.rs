use serde::{Deserialize, Serialize};

use crate::user::Role;

/// A verified identity assertion handed in by the authentication boundary.
/// The core never talks to the identity provider itself; it only consumes
/// the claims an upstream verifier has already checked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityAssertion {
    /// Identity-provider subject id, e.g. `auth0|abc123`.
    pub subject: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Role,
}

impl IdentityAssertion {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
