use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use aerovia_core::error::{DomainError, DomainResult};
use aerovia_core::identity::IdentityAssertion;
use aerovia_core::repository::UserStore;
use aerovia_core::user::{Role, User};

use super::map_sqlx;

pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    external_id: Option<String>,
    first_name: String,
    last_name: String,
    phone: Option<String>,
    role: String,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            id: self.id,
            email: self.email,
            external_id: self.external_id,
            first_name: self.first_name,
            last_name: self.last_name,
            phone: self.phone,
            role: Role::parse(&self.role),
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const USER_COLUMNS: &str = "id, email, external_id, first_name, last_name, \
     phone, role, active, created_at, updated_at";

#[async_trait]
impl UserStore for PostgresUserStore {
    async fn get_user(&self, id: Uuid) -> DomainResult<User> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx)?;

        Ok(row.ok_or_else(|| DomainError::not_found("User", id))?.into_user())
    }

    async fn get_by_email(&self, email: &str) -> DomainResult<User> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx)?;

        Ok(row
            .ok_or_else(|| DomainError::not_found("User", email))?
            .into_user())
    }

    async fn upsert_from_identity(&self, identity: &IdentityAssertion) -> DomainResult<User> {
        // Atomic find-or-create on the unique email constraint. Concurrent
        // first logins for the same identity land on the same row instead
        // of racing a read-then-write.
        let row: UserRow = sqlx::query_as(&format!(
            "INSERT INTO users \
             (id, email, external_id, first_name, last_name, role, active, \
              created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, TRUE, NOW(), NOW()) \
             ON CONFLICT (email) DO UPDATE \
             SET external_id = EXCLUDED.external_id, \
                 first_name = COALESCE(NULLIF(EXCLUDED.first_name, ''), users.first_name), \
                 last_name = COALESCE(NULLIF(EXCLUDED.last_name, ''), users.last_name), \
                 updated_at = NOW() \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&identity.email)
        .bind(&identity.subject)
        .bind(identity.first_name.as_deref().unwrap_or(""))
        .bind(identity.last_name.as_deref().unwrap_or(""))
        .bind(identity.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Ok(row.into_user())
    }
}
