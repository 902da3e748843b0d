use crate::{
    error::{is_unique_violation, Error, QueryError},
    schema::{Tag, Uuid},
};

use sqlx::{Pool, Postgres};

/// Inserts a tag for the user, or returns the existing row when the user
/// already has one with this name.
pub async fn upsert_tag(user_id: Uuid, name: &str, pool: &Pool<Postgres>) -> Result<Tag, Error> {
    let tag: Tag = sqlx::query_as(
        "
        INSERT INTO recipe_tags (user_id, name)
        VALUES ($1, $2)
        ON CONFLICT (user_id, name) DO UPDATE SET name = EXCLUDED.name
        RETURNING *;
    ",
    )
    .bind(user_id)
    .bind(name)
    .fetch_one(pool)
    .await
    .map_err(|e| Error::from(QueryError::from(e)))?;

    Ok(tag)
}

pub async fn get_tag(id: Uuid, user_id: Uuid, pool: &Pool<Postgres>) -> Result<Option<Tag>, Error> {
    let row: Option<Tag> = sqlx::query_as("SELECT * FROM recipe_tags WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| Error::from(QueryError::from(e)))?;

    Ok(row)
}

/// Lists the user's tags, name-descending. With `assigned_only` set, rows
/// not referenced by any recipe are left out.
pub async fn list_tags(
    user_id: Uuid,
    assigned_only: bool,
    pool: &Pool<Postgres>,
) -> Result<Vec<Tag>, Error> {
    let rows: Vec<Tag> = match assigned_only {
        true => {
            sqlx::query_as(
                "
                SELECT DISTINCT t.id, t.user_id, t.name FROM recipe_tags t
                INNER JOIN recipe_tags_map m ON m.tag_id = t.id
                WHERE t.user_id = $1
                ORDER BY t.name DESC
            ",
            )
            .bind(user_id)
            .fetch_all(pool)
            .await
            .map_err(|e| Error::from(QueryError::from(e)))?
        }
        false => {
            sqlx::query_as("SELECT * FROM recipe_tags WHERE user_id = $1 ORDER BY name DESC")
                .bind(user_id)
                .fetch_all(pool)
                .await
                .map_err(|e| Error::from(QueryError::from(e)))?
        }
    };

    Ok(rows)
}

pub async fn rename_tag(
    id: Uuid,
    user_id: Uuid,
    name: &str,
    pool: &Pool<Postgres>,
) -> Result<Tag, Error> {
    let row: Option<Tag> = sqlx::query_as(
        "UPDATE recipe_tags SET name = $1 WHERE id = $2 AND user_id = $3 RETURNING *",
    )
    .bind(name)
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| match is_unique_violation(&e) {
        true => Error::Validation(String::from("tag with this name already exists")),
        false => Error::from(QueryError::from(e)),
    })?;

    row.ok_or(Error::NotFound)
}

pub async fn delete_tag(id: Uuid, user_id: Uuid, pool: &Pool<Postgres>) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM recipe_tags WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await
        .map_err(|e| Error::from(QueryError::from(e)))?;

    if result.rows_affected() <= 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}
