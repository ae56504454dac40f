//! HS256 bearer-token issuer.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cultiva_application::TokenIssuer;
use cultiva_core::{AppError, AppResult, AuthClaims, Role};

/// Minimum accepted signing-secret length in bytes.
const MIN_SECRET_LENGTH: usize = 32;

/// Signed-token claims as stored in the wire token.
#[derive(Debug, Serialize, Deserialize)]
struct WireClaims {
    sub: String,
    role: String,
    iat: i64,
    exp: i64,
}

/// Token issuer backed by HS256-signed JWTs.
pub struct JwtTokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_seconds: i64,
}

impl JwtTokenIssuer {
    /// Creates an issuer from a shared secret and a token lifetime.
    pub fn new(secret: &str, ttl_seconds: i64) -> AppResult<Self> {
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(AppError::Validation(format!(
                "token secret must be at least {MIN_SECRET_LENGTH} characters"
            )));
        }
        if ttl_seconds <= 0 {
            return Err(AppError::Validation(
                "token lifetime must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
            ttl_seconds,
        })
    }
}

impl TokenIssuer for JwtTokenIssuer {
    fn issue(&self, claims: &AuthClaims) -> AppResult<String> {
        let issued_at = Utc::now().timestamp();
        let wire_claims = WireClaims {
            sub: claims.user_id().to_string(),
            role: claims.role().as_str().to_owned(),
            iat: issued_at,
            exp: issued_at.saturating_add(self.ttl_seconds),
        };

        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &wire_claims,
            &self.encoding_key,
        )
        .map_err(|error| AppError::Internal(format!("failed to sign token: {error}")))
    }

    fn verify(&self, token: &str) -> AppResult<AuthClaims> {
        let data =
            jsonwebtoken::decode::<WireClaims>(token, &self.decoding_key, &self.validation)
                .map_err(|_| AppError::Unauthorized("invalid or expired token".to_owned()))?;

        let user_id = Uuid::parse_str(&data.claims.sub)
            .map_err(|_| AppError::Unauthorized("invalid or expired token".to_owned()))?;
        let role = Role::parse(&data.claims.role)
            .map_err(|_| AppError::Unauthorized("invalid or expired token".to_owned()))?;

        Ok(AuthClaims::new(user_id, role))
    }
}
