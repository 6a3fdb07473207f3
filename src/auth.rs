use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, header, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::{
    config::{AppConfig, Env},
    models::Principal,
    store::ArticleStoreState,
};

/// Header accepted in `Env::Local` to act as a stored user without a token.
pub const LOCAL_USER_HEADER: &str = "x-user-name";

/// Claims
///
/// Payload of the bearer token issued by the identity subsystem.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the user name, matched against `users.user_name`.
    pub sub: String,
    /// Roles granted to the subject, e.g. `["Admin"]`.
    #[serde(default)]
    pub roles: Vec<String>,
    /// Expiration Time (exp).
    pub exp: usize,
    /// Issued At (iat).
    pub iat: usize,
}

/// Principal Extractor Implementation
///
/// Resolves the caller of an authenticated request:
/// 1. Local bypass: in `Env::Local`, an `x-user-name` header naming a stored
///    user authenticates as that user with its stored roles.
/// 2. Bearer token: an HS256 JWT whose claims carry the name and roles.
///
/// Rejection: `StatusCode::UNAUTHORIZED` on any failure.
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
    ArticleStoreState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);

        if config.env == Env::Local {
            let header_name = parts
                .headers
                .get(LOCAL_USER_HEADER)
                .and_then(|value| value.to_str().ok());
            if let Some(name) = header_name {
                let store = ArticleStoreState::from_ref(state);
                match store.find_user_by_name(name).await {
                    Ok(Some(user)) => return Ok(Principal::new(user.user_name, user.roles)),
                    Ok(None) => tracing::debug!(user = %name, "local bypass user not found"),
                    Err(e) => tracing::warn!(error = %e, "local bypass lookup failed"),
                }
            }
        }
        // Production, or a failed bypass: fall through to token validation.

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
        let mut validation = Validation::default();
        validation.validate_exp = true;

        let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
            tracing::debug!(error = %e, "bearer token rejected");
            StatusCode::UNAUTHORIZED
        })?;

        let Claims { sub, roles, .. } = token_data.claims;
        if sub.is_empty() {
            return Err(StatusCode::UNAUTHORIZED);
        }
        Ok(Principal::new(sub, roles))
    }
}
