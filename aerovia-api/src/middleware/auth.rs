use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::RequestPartsExt;
use axum_extra::headers::{authorization::Bearer, Authorization};
use axum_extra::TypedHeader;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use aerovia_core::identity::IdentityAssertion;
use aerovia_core::user::Role;

use crate::error::AppError;
use crate::state::AppState;

/// Claims of the bearer token issued by the identity provider. The token
/// arrives already signed; this service only verifies the signature and
/// lifts the claims into an identity assertion.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    pub exp: usize,
}

impl Claims {
    pub fn into_assertion(self) -> IdentityAssertion {
        IdentityAssertion {
            subject: self.sub,
            email: self.email,
            first_name: self.given_name,
            last_name: self.family_name,
            role: self.role.as_deref().map(Role::parse).unwrap_or(Role::User),
        }
    }
}

/// Extractor for the verified caller identity.
pub struct Identity(pub IdentityAssertion);

impl FromRequestParts<AppState> for Identity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AppError::AuthenticationError("missing bearer token".to_string()))?;

        let token_data = decode::<Claims>(
            bearer.token(),
            &DecodingKey::from_secret(state.auth.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|err| AppError::AuthenticationError(err.to_string()))?;

        Ok(Identity(token_data.claims.into_assertion()))
    }
}

/// Extractor that additionally requires the Admin role.
pub struct AdminIdentity(pub IdentityAssertion);

impl FromRequestParts<AppState> for AdminIdentity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Identity(identity) = Identity::from_request_parts(parts, state).await?;
        if !identity.is_admin() {
            return Err(AppError::AuthorizationError(
                "admin role required".to_string(),
            ));
        }
        Ok(AdminIdentity(identity))
    }
}
