//! Token verification (C1), grounded on the original ruleset's
//! `WSAuthenticator.validate_token`: check the algorithm against an
//! allowlist before ever touching JWKS, then verify signature + claims.
//! Unlike a typical HTTP auth middleware this never panics or bails with
//! a 401 directly — callers (the WebSocket upgrade handler, HTTP routes)
//! decide how to surface an `AuthError`.

use std::sync::Arc;

use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AuthError;

use super::jwks::JwksClient;

/// Mirrors the Python authenticator's allowlist: RSA/EC/EdDSA only, no HMAC
/// (a shared-secret algorithm has no business verifying a third-party IdP
/// token) and no `none`.
const ALLOWED_ALGORITHMS: &[Algorithm] = &[
    Algorithm::RS256,
    Algorithm::RS384,
    Algorithm::RS512,
    Algorithm::ES256,
    Algorithm::ES384,
    Algorithm::EdDSA,
];

#[derive(Debug, Deserialize)]
struct Claims {
    sub: Uuid,
    #[allow(dead_code)]
    aud: Option<String>,
    #[allow(dead_code)]
    exp: usize,
}

#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
}

pub struct TokenVerifier {
    jwks: Arc<JwksClient>,
}

impl TokenVerifier {
    pub fn new(jwks_url: impl Into<String>) -> Self {
        Self { jwks: Arc::new(JwksClient::new(jwks_url)) }
    }

    pub async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        let header = decode_header(token).map_err(|_| AuthError::Malformed)?;
        if !ALLOWED_ALGORITHMS.contains(&header.alg) {
            return Err(AuthError::AlgorithmNotAllowed);
        }
        let kid = header.kid.ok_or(AuthError::Malformed)?;

        let jwk = self.jwks.signing_key_for(&kid).await?;
        let decoding_key = DecodingKey::from_jwk(&jwk).map_err(|_| AuthError::SignatureInvalid)?;

        let mut validation = Validation::new(header.alg);
        validation.set_audience(&["authenticated"]);

        let data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
            use jsonwebtoken::errors::ErrorKind;
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::SignatureInvalid,
            }
        })?;

        Ok(Identity { user_id: data.claims.sub })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_token_is_missing_not_malformed() {
        let verifier = TokenVerifier::new("https://example.test/.well-known/jwks.json");
        let result = verifier.verify("").await;
        assert!(matches!(result, Err(AuthError::MissingToken)));
    }

    #[tokio::test]
    async fn garbage_token_is_malformed() {
        let verifier = TokenVerifier::new("https://example.test/.well-known/jwks.json");
        let result = verifier.verify("not-a-jwt").await;
        assert!(matches!(result, Err(AuthError::Malformed)));
    }
}
