use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

use crate::AppState;
use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// The authenticated party behind the current request, taken from the
/// `Authorization: Bearer` header. Every core operation receives this
/// identifier explicitly; there is no ambient session state.
pub struct AuthParty(pub Uuid);

/// Builds a bearer token of the form `<party_id>.<hex hmac>`, signed over the
/// canonical party id with the configured secret.
pub fn issue_token(secret: &str, party_id: Uuid) -> Result<String, AppError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| AppError::Internal("invalid auth token secret".to_string()))?;
    mac.update(party_id.to_string().as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());
    Ok(format!("{}.{}", party_id, signature))
}

/// Verify the signature using constant-time comparison.
fn verify_token(secret: &str, token: &str) -> Result<Uuid, AuthError> {
    let (id_part, signature_part) = token.split_once('.').ok_or(AuthError::InvalidFormat)?;
    let party_id = Uuid::parse_str(id_part).map_err(|_| AuthError::InvalidFormat)?;
    let signature = hex::decode(signature_part).map_err(|_| AuthError::InvalidFormat)?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| AuthError::InvalidSecret)?;
    mac.update(party_id.to_string().as_bytes());
    mac.verify_slice(&signature)
        .map_err(|_| AuthError::SignatureMismatch)?;

    Ok(party_id)
}

#[async_trait]
impl FromRequestParts<AppState> for AuthParty {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .ok_or(AuthError::MissingHeader)?;

        let token = header.strip_prefix("Bearer ").unwrap_or(header);
        let party_id = verify_token(&state.config.auth_token_secret, token)?;

        Ok(AuthParty(party_id))
    }
}

#[derive(Debug)]
pub enum AuthError {
    MissingHeader,
    InvalidFormat,
    InvalidSecret,
    SignatureMismatch,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingHeader => (StatusCode::UNAUTHORIZED, "Missing Authorization header"),
            AuthError::InvalidFormat => (StatusCode::UNAUTHORIZED, "Invalid token format"),
            AuthError::InvalidSecret => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Invalid auth secret configuration")
            }
            AuthError::SignatureMismatch => {
                (StatusCode::UNAUTHORIZED, "Token verification failed")
            }
        };

        tracing::warn!("request authentication failed: {:?}", self);
        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn issued_tokens_verify() {
        let party_id = Uuid::new_v4();
        let token = issue_token(SECRET, party_id).unwrap();
        assert_eq!(verify_token(SECRET, &token).unwrap(), party_id);
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let party_id = Uuid::new_v4();
        let token = issue_token(SECRET, party_id).unwrap();
        let mut tampered = token[..token.len() - 2].to_string();
        tampered.push_str("00");
        assert!(verify_token(SECRET, &tampered).is_err());
    }

    #[test]
    fn token_for_a_different_party_is_rejected() {
        let token = issue_token(SECRET, Uuid::new_v4()).unwrap();
        let other = Uuid::new_v4();
        let forged = format!("{}.{}", other, token.split_once('.').unwrap().1);
        assert!(verify_token(SECRET, &forged).is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let party_id = Uuid::new_v4();
        let token = issue_token(SECRET, party_id).unwrap();
        assert!(verify_token("other-secret", &token).is_err());
    }

    #[test]
    fn garbage_tokens_are_rejected() {
        assert!(verify_token(SECRET, "").is_err());
        assert!(verify_token(SECRET, "not-a-token").is_err());
        assert!(verify_token(SECRET, "abc.def").is_err());
        assert!(verify_token(SECRET, &format!("{}.zzzz", Uuid::new_v4())).is_err());
    }
}
