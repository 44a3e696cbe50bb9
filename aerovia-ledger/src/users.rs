use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use aerovia_core::error::DomainResult;
use aerovia_core::identity::IdentityAssertion;
use aerovia_core::repository::UserStore;
use aerovia_core::user::User;

/// Synchronizes user rows with the external identity provider: every
/// authenticated request upserts by email, refreshing the subject id and
/// name claims.
pub struct UserService {
    store: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub async fn sync_identity(&self, identity: &IdentityAssertion) -> DomainResult<User> {
        let user = self.store.upsert_from_identity(identity).await?;
        info!(email = %user.email, "identity synchronized");
        Ok(user)
    }

    pub async fn get_user(&self, id: Uuid) -> DomainResult<User> {
        self.store.get_user(id).await
    }

    pub async fn get_by_email(&self, email: &str) -> DomainResult<User> {
        self.store.get_by_email(email).await
    }
}
