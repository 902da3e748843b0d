use sqlx::{Pool, Postgres};
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

use crate::actions::tags::{delete_tag, list_tags, rename_tag};
use crate::authentication::middleware::with_session;
use crate::config::Config;
use crate::jwt::SessionData;
use crate::schema::Uuid;

use super::filters::with_pool;
use super::forms::{RegistryListQuery, RenameForm};
use super::rejections::reject;

pub fn routes(
    pool: &Pool<Postgres>,
    config: &Config,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let list = warp::path!("api" / "tags")
        .and(warp::get())
        .and(with_session(config.jwt_secret.clone()))
        .and(with_pool(pool.clone()))
        .and(warp::query::<RegistryListQuery>())
        .and_then(list);

    let rename = warp::path!("api" / "tags" / Uuid)
        .and(warp::patch())
        .and(with_session(config.jwt_secret.clone()))
        .and(with_pool(pool.clone()))
        .and(warp::body::json())
        .and_then(rename);

    let delete = warp::path!("api" / "tags" / Uuid)
        .and(warp::delete())
        .and(with_session(config.jwt_secret.clone()))
        .and(with_pool(pool.clone()))
        .and_then(delete);

    list.or(rename).or(delete)
}

async fn list(
    session: SessionData,
    pool: Pool<Postgres>,
    query: RegistryListQuery,
) -> Result<impl Reply, Rejection> {
    let tags = list_tags(session.user_id, query.assigned_only(), &pool)
        .await
        .map_err(reject)?;

    Ok(warp::reply::json(&tags))
}

async fn rename(
    id: Uuid,
    session: SessionData,
    pool: Pool<Postgres>,
    form: RenameForm,
) -> Result<impl Reply, Rejection> {
    let tag = rename_tag(id, session.user_id, &form.name, &pool)
        .await
        .map_err(reject)?;

    Ok(warp::reply::json(&tag))
}

async fn delete(id: Uuid, session: SessionData, pool: Pool<Postgres>) -> Result<impl Reply, Rejection> {
    delete_tag(id, session.user_id, &pool).await.map_err(reject)?;

    Ok(warp::reply::with_status(warp::reply(), StatusCode::NO_CONTENT))
}
