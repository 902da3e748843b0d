use sqlx::{Pool, Postgres};
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

use crate::actions::users::{create_user, get_user_by_id, login_user, update_user};
use crate::authentication::middleware::with_session;
use crate::config::Config;
use crate::error::Error;
use crate::jwt::SessionData;

use super::filters::{with_jwt_secret, with_pool};
use super::forms::{RegisterUserForm, TokenForm, UpdateUserForm};
use super::rejections::reject;

pub fn routes(
    pool: &Pool<Postgres>,
    config: &Config,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let register = warp::path!("api" / "users")
        .and(warp::post())
        .and(with_pool(pool.clone()))
        .and(warp::body::json())
        .and_then(register);

    let token = warp::path!("api" / "users" / "token")
        .and(warp::post())
        .and(with_pool(pool.clone()))
        .and(with_jwt_secret(config.jwt_secret.clone()))
        .and(warp::body::json())
        .and_then(token);

    let me = warp::path!("api" / "users" / "me")
        .and(warp::get())
        .and(with_session(config.jwt_secret.clone()))
        .and(with_pool(pool.clone()))
        .and_then(me);

    let update_me = warp::path!("api" / "users" / "me")
        .and(warp::patch())
        .and(with_session(config.jwt_secret.clone()))
        .and(with_pool(pool.clone()))
        .and(warp::body::json())
        .and_then(update_me);

    register.or(token).or(me).or(update_me)
}

async fn register(pool: Pool<Postgres>, form: RegisterUserForm) -> Result<impl Reply, Rejection> {
    let user = create_user(
        &form.email,
        &form.password,
        form.name.as_deref().unwrap_or(""),
        &pool,
    )
    .await
    .map_err(reject)?;

    Ok(warp::reply::with_status(
        warp::reply::json(&user),
        StatusCode::CREATED,
    ))
}

async fn token(
    pool: Pool<Postgres>,
    secret: String,
    form: TokenForm,
) -> Result<impl Reply, Rejection> {
    let token = login_user(&form.email, &form.password, secret.as_bytes(), &pool)
        .await
        .map_err(reject)?;

    Ok(warp::reply::json(&serde_json::json!({ "token": token })))
}

async fn me(session: SessionData, pool: Pool<Postgres>) -> Result<impl Reply, Rejection> {
    let user = get_user_by_id(&pool, session.user_id)
        .await
        .map_err(reject)?
        .ok_or_else(|| reject(Error::NotFound))?;

    Ok(warp::reply::json(&user))
}

async fn update_me(
    session: SessionData,
    pool: Pool<Postgres>,
    form: UpdateUserForm,
) -> Result<impl Reply, Rejection> {
    let user = update_user(session.user_id, form.name, form.password, &pool)
        .await
        .map_err(reject)?;

    Ok(warp::reply::json(&user))
}
