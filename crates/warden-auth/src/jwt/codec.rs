//! HS256 token issuance and verification.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, dangerous, decode, encode,
};
use uuid::Uuid;

use warden_core::config::auth::AuthConfig;
use warden_entity::user::UserRole;

use super::claims::{Claims, IssuedToken};
use crate::error::{AuthError, AuthResult};

/// Signs and verifies access tokens with a single shared secret.
///
/// Verification is purely cryptographic: it never consults the session
/// store.
#[derive(Clone)]
pub struct TokenCodec {
    /// HMAC key for signing.
    encoding_key: EncodingKey,
    /// HMAC key for verification.
    decoding_key: DecodingKey,
    /// Value written to and required in `iss`.
    issuer: String,
    /// Signature + issuer validation. Expiry is checked separately.
    verify: Validation,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("issuer", &self.issuer)
            .finish()
    }
}

impl TokenCodec {
    /// Creates a codec from auth configuration.
    ///
    /// Fails with [`AuthError::Signing`] when the secret is empty.
    pub fn new(config: &AuthConfig) -> AuthResult<Self> {
        Self::from_secret(config.jwt_secret.as_bytes(), &config.issuer)
    }

    /// Creates a codec from a raw secret.
    pub fn from_secret(secret: &[u8], issuer: &str) -> AuthResult<Self> {
        if secret.is_empty() {
            return Err(AuthError::Signing("signing secret is empty".into()));
        }

        let mut verify = Validation::new(Algorithm::HS256);
        // Expiry is compared manually with zero leeway so that an expired
        // token is distinguishable from a forged one.
        verify.validate_exp = false;
        verify.leeway = 0;
        verify.set_required_spec_claims(&["exp", "sub", "iss"]);
        verify.set_issuer(&[issuer]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer: issuer.to_string(),
            verify,
        })
    }

    /// Builds and signs a claim set valid for `ttl` from now.
    pub fn issue(
        &self,
        subject: Uuid,
        session_id: Uuid,
        tenant: Option<Uuid>,
        role: UserRole,
        ttl: Duration,
    ) -> AuthResult<IssuedToken> {
        let now = Utc::now();
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| AuthError::Signing(format!("token TTL out of range: {e}")))?;
        let expires_at = now + ttl;

        let claims = Claims {
            iss: self.issuer.clone(),
            sub: subject,
            sid: session_id,
            tenant,
            role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Verifies signature and issuer, then requires `exp > now`.
    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.verify)
            .map_err(|e| {
                tracing::debug!(error = %e, "Token rejected");
                AuthError::TokenMalformed
            })?
            .claims;

        if claims.exp <= Utc::now().timestamp() {
            return Err(AuthError::TokenExpired);
        }
        Ok(claims)
    }

    /// Reads claims without checking signature or expiry.
    ///
    /// Only for flows where the caller proves intent some other way (the
    /// refresh token). Never use the result for authorization.
    pub fn decode_unverified(&self, token: &str) -> AuthResult<Claims> {
        dangerous::insecure_decode::<Claims>(token)
            .map(|data| data.claims)
            .map_err(|_| AuthError::TokenMalformed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::from_secret(b"test-secret", "warden").unwrap()
    }

    #[test]
    fn test_issue_then_verify() {
        let codec = codec();
        let (sub, sid, tenant) = (Uuid::new_v4(), Uuid::new_v4(), Some(Uuid::new_v4()));
        let issued = codec
            .issue(sub, sid, tenant, UserRole::Owner, Duration::from_secs(300))
            .unwrap();

        let claims = codec.verify(&issued.token).unwrap();
        assert_eq!(claims.sub, sub);
        assert_eq!(claims.sid, sid);
        assert_eq!(claims.tenant, tenant);
        assert_eq!(claims.role, UserRole::Owner);
        assert_eq!(claims.iss, "warden");
        assert_eq!(claims.exp, issued.expires_at.timestamp());
    }

    #[test]
    fn test_zero_ttl_is_expired() {
        let codec = codec();
        let issued = codec
            .issue(Uuid::new_v4(), Uuid::new_v4(), None, UserRole::SuperAdmin, Duration::ZERO)
            .unwrap();
        assert_eq!(codec.verify(&issued.token), Err(AuthError::TokenExpired));
    }

    #[test]
    fn test_foreign_signature_is_malformed() {
        let other = TokenCodec::from_secret(b"other-secret", "warden").unwrap();
        let issued = other
            .issue(Uuid::new_v4(), Uuid::new_v4(), None, UserRole::Nurse, Duration::from_secs(60))
            .unwrap();
        assert_eq!(codec().verify(&issued.token), Err(AuthError::TokenMalformed));
    }

    #[test]
    fn test_foreign_signature_even_when_expired_is_malformed() {
        let other = TokenCodec::from_secret(b"other-secret", "warden").unwrap();
        let issued = other
            .issue(Uuid::new_v4(), Uuid::new_v4(), None, UserRole::Nurse, Duration::ZERO)
            .unwrap();
        assert_eq!(codec().verify(&issued.token), Err(AuthError::TokenMalformed));
    }

    #[test]
    fn test_wrong_issuer_is_malformed() {
        let other = TokenCodec::from_secret(b"test-secret", "someone-else").unwrap();
        let issued = other
            .issue(Uuid::new_v4(), Uuid::new_v4(), None, UserRole::Nurse, Duration::from_secs(60))
            .unwrap();
        assert_eq!(codec().verify(&issued.token), Err(AuthError::TokenMalformed));
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert_eq!(codec().verify("not-a-token"), Err(AuthError::TokenMalformed));
        assert_eq!(
            codec().decode_unverified("a.b.c"),
            Err(AuthError::TokenMalformed)
        );
    }

    #[test]
    fn test_decode_unverified_ignores_signature_and_expiry() {
        let other = TokenCodec::from_secret(b"other-secret", "elsewhere").unwrap();
        let (sub, sid) = (Uuid::new_v4(), Uuid::new_v4());
        let issued = other
            .issue(sub, sid, None, UserRole::Doctor, Duration::ZERO)
            .unwrap();

        let claims = codec().decode_unverified(&issued.token).unwrap();
        assert_eq!((claims.sub, claims.sid), (sub, sid));
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(matches!(
            TokenCodec::from_secret(b"", "warden"),
            Err(AuthError::Signing(_))
        ));
    }
}
