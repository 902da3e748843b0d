use std::convert::Infallible;
use std::path::PathBuf;

use sqlx::{Pool, Postgres};
use warp::Filter;

pub fn with_pool(
    pool: Pool<Postgres>,
) -> impl Filter<Extract = (Pool<Postgres>,), Error = Infallible> + Clone {
    warp::any().map(move || pool.clone())
}

pub fn with_jwt_secret(
    secret: String,
) -> impl Filter<Extract = (String,), Error = Infallible> + Clone {
    warp::any().map(move || secret.clone())
}

pub fn with_media_root(
    media_root: PathBuf,
) -> impl Filter<Extract = (PathBuf,), Error = Infallible> + Clone {
    warp::any().map(move || media_root.clone())
}
