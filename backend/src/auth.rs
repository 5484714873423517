use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    routes::response::{Flash, Redirect, SIGN_IN_PATH},
    AppState,
};

pub const SIGN_IN_REQUIRED: &str = "You need to sign in or sign up before continuing.";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,  // User ID
    pub name: String, // Display name
    pub exp: usize,   // Expiration time
}

#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: i64,
    pub name: String,
}

/// Where anonymous visitors are sent
pub fn sign_in_redirect() -> Redirect {
    Redirect::to(SIGN_IN_PATH).with_flash(Flash::Alert(SIGN_IN_REQUIRED.to_string()))
}

/// Extractor for authenticated users from JWT tokens
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = Redirect;

    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let app_state = Arc::<AppState>::from_ref(state);

        // Try to extract token from Authorization header first
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "))
            .map(String::from)
            // If no Authorization header, try query parameter
            .or_else(|| {
                parts
                    .uri
                    .query()
                    .and_then(|q| {
                        serde_urlencoded::from_str::<Vec<(String, String)>>(q).ok()
                    })
                    .and_then(|params| {
                        params
                            .iter()
                            .find(|(k, _)| k == "token")
                            .map(|(_, v)| v.clone())
                    })
            });

        async move {
            let token = token.ok_or_else(sign_in_redirect)?;
            verify_token(&token, &app_state.config.security.jwt_secret).ok_or_else(|| {
                tracing::debug!("Rejected invalid or expired token");
                sign_in_redirect()
            })
        }
    }
}

/// Decode a token into the user it was issued for
pub fn verify_token(token: &str, jwt_secret: &str) -> Option<AuthenticatedUser> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_ref()),
        &Validation::default(),
    )
    .ok()?;

    let user_id = token_data.claims.sub.parse::<i64>().ok()?;

    Some(AuthenticatedUser {
        user_id,
        name: token_data.claims.name,
    })
}

/// Generate a JWT token for a user
pub fn generate_token(
    user_id: i64,
    name: &str,
    jwt_secret: &str,
    ttl_hours: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let expiration = (chrono::Utc::now() + chrono::Duration::hours(ttl_hours)).timestamp();

    let claims = Claims {
        sub: user_id.to_string(),
        name: name.to_string(),
        exp: expiration.max(0) as usize,
    };

    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(jwt_secret.as_ref()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip() {
        let token = generate_token(42, "Vadim", "secret", 1).unwrap();
        let user = verify_token(&token, "secret").unwrap();

        assert_eq!(user.user_id, 42);
        assert_eq!(user.name, "Vadim");
    }

    #[test]
    fn test_token_with_wrong_secret_is_rejected() {
        let token = generate_token(42, "Vadim", "secret", 1).unwrap();
        assert!(verify_token(&token, "other").is_none());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let token = generate_token(42, "Vadim", "secret", -2).unwrap();
        assert!(verify_token(&token, "secret").is_none());
    }
}
