use warp::{reject, Filter, Rejection};

use crate::constants::AUTHORIZATION_SCHEME;
use crate::error::Error;

use super::jwt::{verify_jwt_session, SessionData};

/// Extracts a verified session from the `Authorization` bearer header.
/// Anything short of a valid, unexpired token rejects uniformly.
pub fn with_session(
    secret: String,
) -> impl Filter<Extract = (SessionData,), Error = Rejection> + Clone {
    warp::header::optional::<String>("authorization").and_then(move |header: Option<String>| {
        let secret = secret.clone();
        async move {
            let token = header
                .as_deref()
                .and_then(|value| value.strip_prefix(AUTHORIZATION_SCHEME))
                .ok_or_else(|| reject::custom(Error::Unauthorized))?;

            match verify_jwt_session(token, secret.as_bytes()) {
                Ok(session) => Ok::<SessionData, Rejection>(session.into()),
                Err(_) => Err(reject::custom(Error::Unauthorized)),
            }
        }
    })
}
