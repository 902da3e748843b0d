use std::convert::Infallible;

use warp::http::StatusCode;
use warp::{Rejection, Reply};

use crate::error::Error;

pub fn reject(error: Error) -> Rejection {
    warp::reject::custom(error)
}

/// Renders every rejection as a `{"detail": ...}` JSON body. Ownership
/// failures and true absence share the same not-found arm.
pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, detail) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, String::from("not found"))
    } else if let Some(error) = err.find::<Error>() {
        match error {
            Error::Validation(info) => (StatusCode::BAD_REQUEST, info.to_owned()),
            Error::Unauthorized => (StatusCode::UNAUTHORIZED, error.to_string()),
            Error::NotFound => (StatusCode::NOT_FOUND, String::from("not found")),
            other => {
                log::error!("request failed: {other}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    String::from("internal server error"),
                )
            }
        }
    } else if err
        .find::<warp::filters::body::BodyDeserializeError>()
        .is_some()
    {
        (StatusCode::BAD_REQUEST, String::from("invalid request body"))
    } else if err.find::<warp::reject::InvalidQuery>().is_some() {
        (StatusCode::BAD_REQUEST, String::from("invalid query string"))
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::BAD_REQUEST, String::from("payload too large"))
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            String::from("method not allowed"),
        )
    } else {
        log::error!("unhandled rejection: {err:?}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            String::from("internal server error"),
        )
    };

    let body = warp::reply::json(&serde_json::json!({ "detail": detail }));
    Ok(warp::reply::with_status(body, status))
}
