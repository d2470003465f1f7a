//! HS256 bearer tokens via `jsonwebtoken`.
//!
//! Claims are `{ authorized, user_id, exp }`. A token is accepted only when
//! its signature matches the configured secret, `exp` is in the future, and
//! `authorized` is true.

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mockable::Clock;
use serde::{Deserialize, Serialize};

use crate::domain::UserId;
use crate::domain::ports::{TokenError, TokenIssuer, TokenVerifier};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    authorized: bool,
    user_id: i64,
    /// Expiry as seconds since the Unix epoch.
    exp: u64,
}

/// Issues and verifies tokens signed with a shared secret.
#[derive(Clone)]
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for JwtTokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtTokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl JwtTokenService {
    /// Build a service signing with `secret`; issued tokens live for `ttl`.
    pub fn new(secret: &[u8], ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
            clock,
        }
    }

    fn expiry(&self) -> Result<u64, TokenError> {
        let now = u64::try_from(self.clock.utc().timestamp())
            .map_err(|_| TokenError::signing("clock is before the Unix epoch"))?;
        Ok(now.saturating_add(self.ttl.as_secs()))
    }
}

impl TokenIssuer for JwtTokenService {
    fn issue(&self, user_id: UserId) -> Result<String, TokenError> {
        let claims = Claims {
            authorized: true,
            user_id: user_id.get(),
            exp: self.expiry()?,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|err| TokenError::signing(err.to_string()))
    }
}

impl TokenVerifier for JwtTokenService {
    fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => TokenError::expired(),
                _ => TokenError::invalid(err.to_string()),
            })?;
        if !data.claims.authorized {
            return Err(TokenError::not_authorized());
        }
        Ok(UserId::new(data.claims.user_id))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for token issuance and verification.
    use super::*;
    use chrono::{DateTime, Local, Utc};
    use rstest::{fixture, rstest};

    struct OffsetClock(chrono::Duration);

    impl Clock for OffsetClock {
        fn local(&self) -> DateTime<Local> {
            self.utc().with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            Utc::now() + self.0
        }
    }

    fn service_at(secret: &[u8], offset: chrono::Duration) -> JwtTokenService {
        JwtTokenService::new(
            secret,
            Duration::from_secs(3600),
            Arc::new(OffsetClock(offset)),
        )
    }

    #[fixture]
    fn service() -> JwtTokenService {
        service_at(b"test-secret", chrono::Duration::zero())
    }

    #[rstest]
    fn issued_token_verifies_to_the_same_user(service: JwtTokenService) {
        let token = service.issue(UserId::new(7)).expect("issue");
        assert_eq!(service.verify(&token).expect("verify"), UserId::new(7));
    }

    #[rstest]
    fn token_signed_with_another_secret_is_invalid(service: JwtTokenService) {
        let other = service_at(b"other-secret", chrono::Duration::zero());
        let token = other.issue(UserId::new(7)).expect("issue");
        assert!(matches!(
            service.verify(&token),
            Err(TokenError::Invalid { .. })
        ));
    }

    #[rstest]
    fn expired_token_is_rejected(service: JwtTokenService) {
        let past = service_at(b"test-secret", chrono::Duration::hours(-3));
        let token = past.issue(UserId::new(7)).expect("issue");
        assert_eq!(service.verify(&token), Err(TokenError::expired()));
    }

    #[rstest]
    fn unauthorized_claim_is_rejected(service: JwtTokenService) {
        let claims = Claims {
            authorized: false,
            user_id: 7,
            exp: service.expiry().expect("expiry"),
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .expect("encode");
        assert_eq!(service.verify(&token), Err(TokenError::not_authorized()));
    }

    #[rstest]
    #[case("")]
    #[case("not-a-token")]
    #[case("a.b.c")]
    fn garbage_is_invalid(service: JwtTokenService, #[case] token: &str) {
        assert!(matches!(
            service.verify(token),
            Err(TokenError::Invalid { .. })
        ));
    }
}
