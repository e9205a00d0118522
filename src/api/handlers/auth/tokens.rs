//! Access and refresh token issuance and validation.
//!
//! Both token kinds share one wire shape with a `token_type` claim, but
//! verification surfaces them as distinct [`VerifiedToken`] variants so a
//! call site cannot accept the wrong kind by forgetting a string check.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::types::AdminRole;

/// Access tokens authorize individual requests; keep them short.
pub const ACCESS_TTL_SECONDS: i64 = 15 * 60;
/// Refresh tokens only mint new pairs; scoped to the refresh endpoint.
pub const REFRESH_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

const TYPE_ACCESS: &str = "access";
const TYPE_REFRESH: &str = "refresh";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Random per-token id. Replay detection is not implemented; the marker
    /// exists so it can be without reissuing every session.
    pub jti: String,
    pub sub: Uuid,
    pub username: String,
    pub role: AdminRole,
    pub iat: i64,
    pub exp: i64,
    token_type: String,
}

/// A signature-valid, unexpired token, split by its claimed type.
#[derive(Debug)]
pub enum VerifiedToken {
    Access(TokenClaims),
    Refresh(TokenClaims),
}

impl VerifiedToken {
    #[must_use]
    pub fn into_access(self) -> Option<TokenClaims> {
        match self {
            Self::Access(claims) => Some(claims),
            Self::Refresh(_) => None,
        }
    }

    #[must_use]
    pub fn into_refresh(self) -> Option<TokenClaims> {
        match self {
            Self::Refresh(claims) => Some(claims),
            Self::Access(_) => None,
        }
    }
}

/// Signs and verifies session tokens with a symmetric secret.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl_seconds: i64,
    refresh_ttl_seconds: i64,
}

impl TokenService {
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        Self::with_ttls(secret, ACCESS_TTL_SECONDS, REFRESH_TTL_SECONDS)
    }

    #[must_use]
    pub fn with_ttls(
        secret: &SecretString,
        access_ttl_seconds: i64,
        refresh_ttl_seconds: i64,
    ) -> Self {
        let secret = secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            access_ttl_seconds,
            refresh_ttl_seconds,
        }
    }

    /// Issue an access token for the given admin.
    ///
    /// # Errors
    /// Returns an error if claim serialization or signing fails.
    pub fn issue_access(
        &self,
        user_id: Uuid,
        username: &str,
        role: AdminRole,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue(user_id, username, role, TYPE_ACCESS, self.access_ttl_seconds)
    }

    /// Issue a refresh token for the given admin.
    ///
    /// # Errors
    /// Returns an error if claim serialization or signing fails.
    pub fn issue_refresh(
        &self,
        user_id: Uuid,
        username: &str,
        role: AdminRole,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue(
            user_id,
            username,
            role,
            TYPE_REFRESH,
            self.refresh_ttl_seconds,
        )
    }

    fn issue(
        &self,
        user_id: Uuid,
        username: &str,
        role: AdminRole,
        token_type: &str,
        ttl_seconds: i64,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = now_secs();
        let claims = TokenClaims {
            jti: Uuid::new_v4().to_string(),
            sub: user_id,
            username: username.to_string(),
            role,
            iat: now,
            exp: now + ttl_seconds,
            token_type: token_type.to_string(),
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
    }

    /// Validate a token. Bad signatures, malformed tokens, expiry, and
    /// unknown type tags all collapse to `None`; callers cannot tell which
    /// failure occurred, and neither can the client.
    #[must_use]
    pub fn verify(&self, token: &str) -> Option<VerifiedToken> {
        let data =
            jsonwebtoken::decode::<TokenClaims>(token, &self.decoding_key, &Validation::default())
                .ok()?;
        match data.claims.token_type.as_str() {
            TYPE_ACCESS => Some(VerifiedToken::Access(data.claims)),
            TYPE_REFRESH => Some(VerifiedToken::Refresh(data.claims)),
            _ => None,
        }
    }
}

fn now_secs() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::SystemTime::UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(&SecretString::from("test-secret-key".to_string()))
    }

    #[test]
    fn issue_and_verify_access_token() {
        let tokens = service();
        let user_id = Uuid::new_v4();
        let token = tokens
            .issue_access(user_id, "root", AdminRole::SuperAdmin)
            .expect("issuing should work");

        let claims = tokens
            .verify(&token)
            .and_then(VerifiedToken::into_access)
            .expect("should verify as access");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.username, "root");
        assert_eq!(claims.role, AdminRole::SuperAdmin);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn issue_and_verify_refresh_token() {
        let tokens = service();
        let token = tokens
            .issue_refresh(Uuid::new_v4(), "root", AdminRole::Admin)
            .expect("issuing should work");

        let verified = tokens.verify(&token).expect("should verify");
        assert!(matches!(verified, VerifiedToken::Refresh(_)));
    }

    #[test]
    fn token_types_are_isolated() {
        let tokens = service();
        let access = tokens
            .issue_access(Uuid::new_v4(), "root", AdminRole::Admin)
            .expect("issuing should work");
        let refresh = tokens
            .issue_refresh(Uuid::new_v4(), "root", AdminRole::Admin)
            .expect("issuing should work");

        // A signature-valid token of the wrong kind must not pass.
        assert!(tokens.verify(&access).and_then(VerifiedToken::into_refresh).is_none());
        assert!(tokens.verify(&refresh).and_then(VerifiedToken::into_access).is_none());
    }

    #[test]
    fn wrong_secret_fails_verification() {
        let tokens = service();
        let other = TokenService::new(&SecretString::from("different-secret".to_string()));

        let token = tokens
            .issue_access(Uuid::new_v4(), "root", AdminRole::Admin)
            .expect("issuing should work");
        assert!(other.verify(&token).is_none());
    }

    #[test]
    fn garbage_fails_verification() {
        let tokens = service();
        assert!(tokens.verify("not-a-token").is_none());
        assert!(tokens.verify("").is_none());
    }

    #[test]
    fn expired_token_fails_verification() {
        // TTL far enough in the past to clear the default validation leeway.
        let secret = SecretString::from("test-secret-key".to_string());
        let tokens = TokenService::with_ttls(&secret, -120, -120);
        let token = tokens
            .issue_access(Uuid::new_v4(), "root", AdminRole::Admin)
            .expect("issuing should work");
        assert!(tokens.verify(&token).is_none());
    }

    #[test]
    fn tokens_carry_unique_ids() {
        let tokens = service();
        let user_id = Uuid::new_v4();
        let first = tokens
            .issue_access(user_id, "root", AdminRole::Admin)
            .expect("issuing should work");
        let second = tokens
            .issue_access(user_id, "root", AdminRole::Admin)
            .expect("issuing should work");

        let first_claims = tokens
            .verify(&first)
            .and_then(VerifiedToken::into_access)
            .expect("should verify");
        let second_claims = tokens
            .verify(&second)
            .and_then(VerifiedToken::into_access)
            .expect("should verify");
        assert_ne!(first_claims.jti, second_claims.jti);
    }
}
