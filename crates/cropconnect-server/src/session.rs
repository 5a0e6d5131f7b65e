// SPDX-License-Identifier: Apache-2.0

//! Stateless bearer sessions: `base64url(payload).base64url(hmac)`.

use std::fmt;
use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use cropconnect_core::{constant_time_eq, hmac_sha256};
use cropconnect_model::{Actor, Role, User, UserId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionClaims {
    pub uid: String,
    pub role: Role,
    pub username: String,
    /// Expiry as unix seconds.
    pub exp: i64,
}

impl SessionClaims {
    pub fn actor(&self) -> Result<Actor, SessionError> {
        let user_id = UserId::parse(self.uid.clone()).map_err(|_| SessionError::Malformed)?;
        Ok(Actor::new(user_id, self.role))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    Malformed,
    BadSignature,
    Expired,
    Signing,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => f.write_str("session token is malformed"),
            Self::BadSignature => f.write_str("session token signature mismatch"),
            Self::Expired => f.write_str("session token has expired"),
            Self::Signing => f.write_str("session token could not be signed"),
        }
    }
}

impl std::error::Error for SessionError {}

#[derive(Clone)]
pub struct SessionSigner {
    secret: Vec<u8>,
    ttl: Duration,
}

impl fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionSigner")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl SessionSigner {
    #[must_use]
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            secret: secret.to_vec(),
            ttl,
        }
    }

    pub fn issue(
        &self,
        user: &User,
        now: DateTime<Utc>,
    ) -> Result<(String, DateTime<Utc>), SessionError> {
        let ttl = chrono::Duration::from_std(self.ttl).map_err(|_| SessionError::Signing)?;
        let expires_at = now + ttl;
        let claims = SessionClaims {
            uid: user.id.to_string(),
            role: user.role,
            username: user.username.clone(),
            exp: expires_at.timestamp(),
        };
        let payload = serde_json::to_vec(&claims).map_err(|_| SessionError::Signing)?;
        let payload = URL_SAFE_NO_PAD.encode(payload);
        let signature = hmac_sha256(&self.secret, payload.as_bytes()).ok_or(SessionError::Signing)?;
        Ok((
            format!("{payload}.{}", URL_SAFE_NO_PAD.encode(signature)),
            expires_at,
        ))
    }

    /// Signature is checked before the payload is decoded.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, SessionError> {
        let (payload, signature) = token.trim().split_once('.').ok_or(SessionError::Malformed)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| SessionError::Malformed)?;
        let expected =
            hmac_sha256(&self.secret, payload.as_bytes()).ok_or(SessionError::BadSignature)?;
        if !constant_time_eq(&expected, &signature) {
            return Err(SessionError::BadSignature);
        }
        let bytes = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| SessionError::Malformed)?;
        let claims: SessionClaims =
            serde_json::from_slice(&bytes).map_err(|_| SessionError::Malformed)?;
        if claims.exp <= now.timestamp() {
            return Err(SessionError::Expired);
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn user() -> User {
        User {
            id: UserId::parse("u-1").expect("id"),
            name: "Wanjiru".to_string(),
            username: "wanjiru".to_string(),
            role: Role::Farmer,
            location: "Nakuru".to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).single().expect("ts"),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 1, 8, 0, 0).single().expect("ts")
    }

    #[test]
    fn issued_token_verifies_into_an_actor() {
        let signer = SessionSigner::new(b"secret", Duration::from_secs(60));
        let (token, expires_at) = signer.issue(&user(), now()).expect("issue");
        assert_eq!(expires_at, now() + chrono::Duration::seconds(60));
        let claims = signer.verify(&token, now()).expect("verify");
        assert_eq!(claims.username, "wanjiru");
        let actor = claims.actor().expect("actor");
        assert_eq!(actor.user_id.as_str(), "u-1");
        assert_eq!(actor.role, Role::Farmer);
    }

    #[test]
    fn expired_token_is_rejected() {
        let signer = SessionSigner::new(b"secret", Duration::from_secs(60));
        let (token, _) = signer.issue(&user(), now()).expect("issue");
        let later = now() + chrono::Duration::seconds(60);
        assert_eq!(signer.verify(&token, later), Err(SessionError::Expired));
    }

    #[test]
    fn tampered_or_foreign_tokens_are_rejected() {
        let signer = SessionSigner::new(b"secret", Duration::from_secs(60));
        let (token, _) = signer.issue(&user(), now()).expect("issue");

        let other = SessionSigner::new(b"other", Duration::from_secs(60));
        assert_eq!(other.verify(&token, now()), Err(SessionError::BadSignature));

        let (_, signature) = token.split_once('.').expect("dot");
        let forged_payload = URL_SAFE_NO_PAD.encode(
            br#"{"uid":"u-1","role":"BUYER","username":"wanjiru","exp":9999999999}"#,
        );
        let forged = format!("{forged_payload}.{signature}");
        assert_eq!(signer.verify(&forged, now()), Err(SessionError::BadSignature));

        assert_eq!(signer.verify("no-dot", now()), Err(SessionError::Malformed));
        assert_eq!(signer.verify("a.%%%", now()), Err(SessionError::Malformed));
    }
}
