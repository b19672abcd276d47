use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

/// Claims in the JWT the hosted identity provider issues. Authentication
/// itself is delegated; this server only verifies signature and expiry and
/// reads the user id out of `sub`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Email, when the provider includes one
    pub email: Option<String>,
    /// Provider role (authenticated, anon, ...)
    #[serde(default)]
    pub role: String,
    /// Expiration time (as UTC timestamp)
    pub exp: usize,
}

/// Authentication error
#[derive(Debug)]
pub enum AuthError {
    /// Token is missing
    MissingToken,
    /// Token is invalid or expired
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match self {
            AuthError::MissingToken => "Missing bearer token",
            AuthError::InvalidToken => "Invalid or expired token",
        };
        (StatusCode::UNAUTHORIZED, Json(json!({ "error": message }))).into_response()
    }
}

/// The authenticated user attached to requests after verification
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
}

/// Extract the bearer token from a request
pub fn extract_token(parts: &Parts) -> Result<String, AuthError> {
    let auth_header = parts
        .headers
        .get("Authorization")
        .ok_or(AuthError::MissingToken)?;

    let auth_str = auth_header.to_str().map_err(|_| AuthError::InvalidToken)?;

    if !auth_str.starts_with("Bearer ") {
        return Err(AuthError::InvalidToken);
    }

    Ok(auth_str.trim_start_matches("Bearer ").trim().to_string())
}

/// Verifies provider-issued JWTs
pub struct TokenVerifier {
    secret: String,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.to_string(),
        }
    }

    /// Validate a JWT and return its claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|token_data| token_data.claims)
        .map_err(|e| {
            error!("JWT validation error: {:?}", e);
            AuthError::InvalidToken
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token_for(secret: &str, exp_offset: Duration) -> String {
        let claims = Claims {
            sub: "user-123".to_string(),
            email: Some("user@example.com".to_string()),
            role: "authenticated".to_string(),
            exp: (Utc::now() + exp_offset).timestamp() as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn valid_token_yields_claims() {
        let verifier = TokenVerifier::new("secret");
        let token = token_for("secret", Duration::hours(1));
        let claims = verifier.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "user-123");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let verifier = TokenVerifier::new("secret");
        let token = token_for("other-secret", Duration::hours(1));
        assert!(verifier.validate_token(&token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let verifier = TokenVerifier::new("secret");
        let token = token_for("secret", Duration::hours(-2));
        assert!(verifier.validate_token(&token).is_err());
    }
}
