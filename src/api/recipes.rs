use std::path::PathBuf;

use bytes::BufMut;
use futures::TryStreamExt;
use sqlx::{Pool, Postgres};
use warp::http::StatusCode;
use warp::multipart::{FormData, Part};
use warp::{Filter, Rejection, Reply};

use crate::actions::recipes::{
    create_recipe, delete_recipe, fetch_recipes, get_recipe, get_recipe_detail, set_recipe_image,
    update_recipe,
};
use crate::authentication::middleware::with_session;
use crate::config::Config;
use crate::constants::{MAX_IMAGE_UPLOAD_BYTES, RECIPE_IMAGE_DIR};
use crate::error::Error;
use crate::jwt::SessionData;
use crate::schema::Uuid;

use super::filters::{with_media_root, with_pool};
use super::forms::{entry_names, CreateRecipeForm, RecipeListQuery, UpdateRecipeForm};
use super::rejections::reject;

pub fn routes(
    pool: &Pool<Postgres>,
    config: &Config,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let list = warp::path!("api" / "recipes")
        .and(warp::get())
        .and(with_session(config.jwt_secret.clone()))
        .and(with_pool(pool.clone()))
        .and(warp::query::<RecipeListQuery>())
        .and_then(list);

    let create = warp::path!("api" / "recipes")
        .and(warp::post())
        .and(with_session(config.jwt_secret.clone()))
        .and(with_pool(pool.clone()))
        .and(warp::body::json())
        .and_then(create);

    let detail = warp::path!("api" / "recipes" / Uuid)
        .and(warp::get())
        .and(with_session(config.jwt_secret.clone()))
        .and(with_pool(pool.clone()))
        .and_then(detail);

    let update = warp::path!("api" / "recipes" / Uuid)
        .and(warp::put().or(warp::patch()).unify())
        .and(with_session(config.jwt_secret.clone()))
        .and(with_pool(pool.clone()))
        .and(warp::body::json())
        .and_then(update);

    let delete = warp::path!("api" / "recipes" / Uuid)
        .and(warp::delete())
        .and(with_session(config.jwt_secret.clone()))
        .and(with_pool(pool.clone()))
        .and_then(delete);

    let upload_image = warp::path!("api" / "recipes" / Uuid / "image")
        .and(warp::post())
        .and(with_session(config.jwt_secret.clone()))
        .and(with_pool(pool.clone()))
        .and(with_media_root(config.media_root.clone()))
        .and(warp::multipart::form().max_length(MAX_IMAGE_UPLOAD_BYTES))
        .and_then(upload_image);

    list.or(create)
        .or(detail)
        .or(update)
        .or(delete)
        .or(upload_image)
}

async fn list(
    session: SessionData,
    pool: Pool<Postgres>,
    query: RecipeListQuery,
) -> Result<impl Reply, Rejection> {
    let tag_ids = match query.tags.as_deref() {
        Some(raw) => Some(super::forms::parse_id_set(raw).map_err(reject)?),
        None => None,
    };
    let ingredient_ids = match query.ingredients.as_deref() {
        Some(raw) => Some(super::forms::parse_id_set(raw).map_err(reject)?),
        None => None,
    };

    let recipes = fetch_recipes(
        session.user_id,
        tag_ids.as_deref(),
        ingredient_ids.as_deref(),
        &pool,
    )
    .await
    .map_err(reject)?;

    Ok(warp::reply::json(&recipes))
}

async fn create(
    session: SessionData,
    pool: Pool<Postgres>,
    form: CreateRecipeForm,
) -> Result<impl Reply, Rejection> {
    if form.title.trim().is_empty() {
        return Err(reject(Error::Validation(String::from(
            "title must not be blank",
        ))));
    }

    let tags = form.tags.as_deref().map(entry_names).unwrap_or_default();
    let ingredients = form
        .ingredients
        .as_deref()
        .map(entry_names)
        .unwrap_or_default();

    let recipe_id = create_recipe(
        session.user_id,
        form.title,
        form.time_minutes,
        form.price,
        form.description.unwrap_or_default(),
        form.link.unwrap_or_default(),
        &tags,
        &ingredients,
        &pool,
    )
    .await
    .map_err(reject)?;

    let detail = get_recipe_detail(recipe_id, session.user_id, &pool)
        .await
        .map_err(reject)?
        .ok_or_else(|| reject(Error::NotFound))?;

    Ok(warp::reply::with_status(
        warp::reply::json(&detail),
        StatusCode::CREATED,
    ))
}

async fn detail(
    id: Uuid,
    session: SessionData,
    pool: Pool<Postgres>,
) -> Result<impl Reply, Rejection> {
    let detail = get_recipe_detail(id, session.user_id, &pool)
        .await
        .map_err(reject)?
        .ok_or_else(|| reject(Error::NotFound))?;

    Ok(warp::reply::json(&detail))
}

async fn update(
    id: Uuid,
    session: SessionData,
    pool: Pool<Postgres>,
    form: UpdateRecipeForm,
) -> Result<impl Reply, Rejection> {
    let tags = form.tags.map(|entries| entry_names(&entries));
    let ingredients = form.ingredients.map(|entries| entry_names(&entries));

    update_recipe(
        id,
        session.user_id,
        form.title,
        form.time_minutes,
        form.price,
        form.description,
        form.link,
        tags,
        ingredients,
        &pool,
    )
    .await
    .map_err(reject)?;

    let detail = get_recipe_detail(id, session.user_id, &pool)
        .await
        .map_err(reject)?
        .ok_or_else(|| reject(Error::NotFound))?;

    Ok(warp::reply::json(&detail))
}

async fn delete(
    id: Uuid,
    session: SessionData,
    pool: Pool<Postgres>,
) -> Result<impl Reply, Rejection> {
    delete_recipe(id, session.user_id, &pool)
        .await
        .map_err(reject)?;

    Ok(warp::reply::with_status(
        warp::reply(),
        StatusCode::NO_CONTENT,
    ))
}

async fn upload_image(
    id: Uuid,
    session: SessionData,
    pool: Pool<Postgres>,
    media_root: PathBuf,
    form: FormData,
) -> Result<impl Reply, Rejection> {
    if get_recipe(id, session.user_id, &pool)
        .await
        .map_err(reject)?
        .is_none()
    {
        return Err(reject(Error::NotFound));
    }

    let data = read_image_part(form).await.map_err(reject)?;
    let extension = validate_image(&data).map_err(reject)?;

    let dir = media_root.join(RECIPE_IMAGE_DIR);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| reject(Error::from(e)))?;

    let path = dir.join(format!("{}.{extension}", uuid::Uuid::new_v4()));
    tokio::fs::write(&path, &data)
        .await
        .map_err(|e| reject(Error::from(e)))?;

    let stored = path.to_string_lossy().into_owned();
    set_recipe_image(id, session.user_id, &stored, &pool)
        .await
        .map_err(reject)?;

    log::info!("stored image for recipe {id} at {stored}");

    Ok(warp::reply::json(&serde_json::json!({ "image": stored })))
}

async fn read_image_part(form: FormData) -> Result<Vec<u8>, Error> {
    let parts: Vec<Part> = form
        .try_collect()
        .await
        .map_err(|_| Error::Validation(String::from("invalid multipart body")))?;

    for part in parts {
        if part.name() == "image" {
            let data = part
                .stream()
                .try_fold(Vec::new(), |mut acc, buf| async move {
                    acc.put(buf);
                    Ok(acc)
                })
                .await
                .map_err(|_| Error::Validation(String::from("invalid multipart body")))?;

            return Ok(data);
        }
    }

    Err(Error::Validation(String::from("missing image field")))
}

/// Confirms the payload decodes as an image and picks the extension the
/// stored file gets.
fn validate_image(data: &[u8]) -> Result<&'static str, Error> {
    let format = image::guess_format(data)
        .map_err(|_| Error::Validation(String::from("payload is not a decodable image")))?;

    image::load_from_memory(data)
        .map_err(|_| Error::Validation(String::from("payload is not a decodable image")))?;

    Ok(format.extensions_str().first().copied().unwrap_or("img"))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::validate_image;

    fn sample_png() -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        image::RgbImage::new(10, 10)
            .write_to(&mut buffer, image::ImageFormat::Png)
            .unwrap();
        buffer.into_inner()
    }

    #[test]
    fn accepts_a_decodable_png() {
        assert_eq!(validate_image(&sample_png()).unwrap(), "png");
    }

    #[test]
    fn rejects_a_payload_that_is_not_an_image() {
        assert!(validate_image(b"notanimage").is_err());
    }

    #[test]
    fn rejects_a_truncated_image() {
        let mut data = sample_png();
        data.truncate(16);

        assert!(validate_image(&data).is_err());
    }
}
