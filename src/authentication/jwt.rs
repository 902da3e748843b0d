use chrono::Duration;
use chrono::Local;
use hmac::{Hmac, Mac};
use jwt::SignWithKey;
use jwt::VerifyWithKey;
use serde::Deserialize;
use serde::Serialize;
use sha2::Sha256;

use crate::constants::SESSION_LIFETIME_HOURS;
use crate::database::error::Error;
use crate::database::schema::User;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JwtSessionData {
    pub user_id: i32,
    pub email: String,
    iat: i64,
    exp: i64,
}

impl JwtSessionData {
    pub fn new(id: i32, email: String) -> Self {
        let now = Local::now();
        let iat = now.timestamp();
        let exp = (now + Duration::hours(SESSION_LIFETIME_HOURS)).timestamp();

        Self {
            user_id: id,
            email,
            iat,
            exp,
        }
    }
}

/// The identity handlers see after the auth filter has run.
#[derive(Debug, Clone)]
pub struct SessionData {
    pub user_id: i32,
    pub email: String,
}

impl Into<SessionData> for JwtSessionData {
    fn into(self) -> SessionData {
        SessionData {
            user_id: self.user_id,
            email: self.email,
        }
    }
}

pub fn generate_jwt_session(user: &User, secret: &[u8]) -> Result<String, Error> {
    let key: Hmac<Sha256> = Hmac::new_from_slice(secret)
        .map_err(|_| Error::Internal(String::from("invalid session key")))?;
    let claims = JwtSessionData::new(user.id, user.email.to_owned());

    claims
        .sign_with_key(&key)
        .map_err(|_| Error::Internal(String::from("failed to sign session token")))
}

pub fn verify_jwt_session(token: &str, secret: &[u8]) -> Result<JwtSessionData, Error> {
    let key: Hmac<Sha256> = Hmac::new_from_slice(secret)
        .map_err(|_| Error::Internal(String::from("invalid session key")))?;

    token
        .verify_with_key(&key)
        .map_err(|_| Error::Unauthorized)
        .map(|session: JwtSessionData| {
            let now = Local::now().timestamp();

            if (session.exp - now).is_negative() {
                return Err(Error::Unauthorized);
            }
            Ok(session)
        })?
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: 7,
            email: String::from("user@example.com"),
            password: String::from("<hash>"),
            name: String::new(),
        }
    }

    #[test]
    fn session_round_trips() {
        let token = generate_jwt_session(&sample_user(), b"test-secret").unwrap();
        let session = verify_jwt_session(&token, b"test-secret").unwrap();

        assert_eq!(session.user_id, 7);
        assert_eq!(session.email, "user@example.com");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = generate_jwt_session(&sample_user(), b"test-secret").unwrap();

        assert!(matches!(
            verify_jwt_session(&token, b"other-secret"),
            Err(Error::Unauthorized)
        ));
    }

    #[test]
    fn expired_session_is_rejected() {
        let now = Local::now().timestamp();
        let claims = JwtSessionData {
            user_id: 7,
            email: String::from("user@example.com"),
            iat: now - 7200,
            exp: now - 3600,
        };
        let key: Hmac<Sha256> = Hmac::new_from_slice(b"test-secret").unwrap();
        let token = claims.sign_with_key(&key).unwrap();

        assert!(matches!(
            verify_jwt_session(&token, b"test-secret"),
            Err(Error::Unauthorized)
        ));
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(matches!(
            verify_jwt_session("not-a-token", b"test-secret"),
            Err(Error::Unauthorized)
        ));
    }
}
