use crate::{
    error::{is_unique_violation, Error, QueryError},
    schema::{Ingredient, Uuid},
};

use sqlx::{Pool, Postgres};

/// Inserts an ingredient for the user, or returns the existing row when
/// the user already has one with this name.
pub async fn upsert_ingredient(
    user_id: Uuid,
    name: &str,
    pool: &Pool<Postgres>,
) -> Result<Ingredient, Error> {
    let ingredient: Ingredient = sqlx::query_as(
        "
        INSERT INTO recipe_ingredients (user_id, name)
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

    Ok(ingredient)
}

pub async fn get_ingredient(
    id: Uuid,
    user_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<Option<Ingredient>, Error> {
    let row: Option<Ingredient> =
        sqlx::query_as("SELECT * FROM recipe_ingredients WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
            .map_err(|e| Error::from(QueryError::from(e)))?;

    Ok(row)
}

/// Lists the user's ingredients, name-descending. With `assigned_only`
/// set, rows not referenced by any recipe are left out.
pub async fn list_ingredients(
    user_id: Uuid,
    assigned_only: bool,
    pool: &Pool<Postgres>,
) -> Result<Vec<Ingredient>, Error> {
    let rows: Vec<Ingredient> = match assigned_only {
        true => {
            sqlx::query_as(
                "
                SELECT DISTINCT i.id, i.user_id, i.name FROM recipe_ingredients i
                INNER JOIN recipe_ingredients_map m ON m.ingredient_id = i.id
                WHERE i.user_id = $1
                ORDER BY i.name DESC
            ",
            )
            .bind(user_id)
            .fetch_all(pool)
            .await
            .map_err(|e| Error::from(QueryError::from(e)))?
        }
        false => {
            sqlx::query_as("SELECT * FROM recipe_ingredients WHERE user_id = $1 ORDER BY name DESC")
                .bind(user_id)
                .fetch_all(pool)
                .await
                .map_err(|e| Error::from(QueryError::from(e)))?
        }
    };

    Ok(rows)
}

pub async fn rename_ingredient(
    id: Uuid,
    user_id: Uuid,
    name: &str,
    pool: &Pool<Postgres>,
) -> Result<Ingredient, Error> {
    let row: Option<Ingredient> = sqlx::query_as(
        "UPDATE recipe_ingredients SET name = $1 WHERE id = $2 AND user_id = $3 RETURNING *",
    )
    .bind(name)
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| match is_unique_violation(&e) {
        true => Error::Validation(String::from("ingredient with this name already exists")),
        false => Error::from(QueryError::from(e)),
    })?;

    row.ok_or(Error::NotFound)
}

pub async fn delete_ingredient(id: Uuid, user_id: Uuid, pool: &Pool<Postgres>) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM recipe_ingredients WHERE id = $1 AND user_id = $2")
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
