use std::collections::HashMap;

use crate::{
    error::{Error, QueryError},
    schema::{
        Ingredient, LinkedIngredient, LinkedTag, Recipe, RecipeDetail, RecipeRow, RecipeSummary,
        Tag, Uuid,
    },
};

use sqlx::{Pool, Postgres, Transaction};

/// Lists the user's recipes, newest id first, optionally narrowed to
/// recipes referencing at least one of the given tag ids and at least one
/// of the given ingredient ids.
pub async fn fetch_recipes(
    user_id: Uuid,
    tag_ids: Option<&[Uuid]>,
    ingredient_ids: Option<&[Uuid]>,
    pool: &Pool<Postgres>,
) -> Result<Vec<RecipeSummary>, Error> {
    let rows: Vec<RecipeRow> = match (tag_ids, ingredient_ids) {
        (Some(tags), Some(ingredients)) => {
            sqlx::query_as(
                "
                SELECT DISTINCT r.id, r.title, r.time_minutes, r.price, r.link FROM recipes r
                INNER JOIN recipe_tags_map tm ON tm.recipe_id = r.id
                INNER JOIN recipe_ingredients_map im ON im.recipe_id = r.id
                WHERE r.user_id = $1 AND tm.tag_id = ANY($2) AND im.ingredient_id = ANY($3)
                ORDER BY r.id DESC
            ",
            )
            .bind(user_id)
            .bind(tags)
            .bind(ingredients)
            .fetch_all(&*pool)
            .await
            .map_err(|e| Error::from(QueryError::from(e)))?
        }
        (Some(tags), None) => {
            sqlx::query_as(
                "
                SELECT DISTINCT r.id, r.title, r.time_minutes, r.price, r.link FROM recipes r
                INNER JOIN recipe_tags_map tm ON tm.recipe_id = r.id
                WHERE r.user_id = $1 AND tm.tag_id = ANY($2)
                ORDER BY r.id DESC
            ",
            )
            .bind(user_id)
            .bind(tags)
            .fetch_all(&*pool)
            .await
            .map_err(|e| Error::from(QueryError::from(e)))?
        }
        (None, Some(ingredients)) => {
            sqlx::query_as(
                "
                SELECT DISTINCT r.id, r.title, r.time_minutes, r.price, r.link FROM recipes r
                INNER JOIN recipe_ingredients_map im ON im.recipe_id = r.id
                WHERE r.user_id = $1 AND im.ingredient_id = ANY($2)
                ORDER BY r.id DESC
            ",
            )
            .bind(user_id)
            .bind(ingredients)
            .fetch_all(&*pool)
            .await
            .map_err(|e| Error::from(QueryError::from(e)))?
        }
        (None, None) => {
            sqlx::query_as(
                "
                SELECT id, title, time_minutes, price, link FROM recipes
                WHERE user_id = $1
                ORDER BY id DESC
            ",
            )
            .bind(user_id)
            .fetch_all(&*pool)
            .await
            .map_err(|e| Error::from(QueryError::from(e)))?
        }
    };

    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let mut tags_by_recipe = group_linked_tags(&ids, pool).await?;
    let mut ingredients_by_recipe = group_linked_ingredients(&ids, pool).await?;

    let summaries = rows
        .into_iter()
        .map(|row| {
            let tags = tags_by_recipe.remove(&row.id).unwrap_or_default();
            let ingredients = ingredients_by_recipe.remove(&row.id).unwrap_or_default();
            RecipeSummary::from_row(row, tags, ingredients)
        })
        .collect();

    Ok(summaries)
}

async fn group_linked_tags(
    recipe_ids: &[Uuid],
    pool: &Pool<Postgres>,
) -> Result<HashMap<Uuid, Vec<Tag>>, Error> {
    let links: Vec<LinkedTag> = sqlx::query_as(
        "
        SELECT m.recipe_id AS recipe_id, t.id AS id, t.user_id AS user_id, t.name AS name
        FROM recipe_tags_map m
        INNER JOIN recipe_tags t ON t.id = m.tag_id
        WHERE m.recipe_id = ANY($1)
        ORDER BY t.id
    ",
    )
    .bind(recipe_ids)
    .fetch_all(pool)
    .await
    .map_err(|e| Error::from(QueryError::from(e)))?;

    let mut hashmap: HashMap<Uuid, Vec<Tag>> = HashMap::new();
    links.into_iter().for_each(|link| {
        let recipe_id = link.recipe_id;
        match hashmap.get_mut(&recipe_id) {
            Some(v) => v.push(link.into()),
            None => {
                hashmap.insert(recipe_id, vec![link.into()]);
            }
        }
    });

    Ok(hashmap)
}

async fn group_linked_ingredients(
    recipe_ids: &[Uuid],
    pool: &Pool<Postgres>,
) -> Result<HashMap<Uuid, Vec<Ingredient>>, Error> {
    let links: Vec<LinkedIngredient> = sqlx::query_as(
        "
        SELECT m.recipe_id AS recipe_id, i.id AS id, i.user_id AS user_id, i.name AS name
        FROM recipe_ingredients_map m
        INNER JOIN recipe_ingredients i ON i.id = m.ingredient_id
        WHERE m.recipe_id = ANY($1)
        ORDER BY i.id
    ",
    )
    .bind(recipe_ids)
    .fetch_all(pool)
    .await
    .map_err(|e| Error::from(QueryError::from(e)))?;

    let mut hashmap: HashMap<Uuid, Vec<Ingredient>> = HashMap::new();
    links.into_iter().for_each(|link| {
        let recipe_id = link.recipe_id;
        match hashmap.get_mut(&recipe_id) {
            Some(v) => v.push(link.into()),
            None => {
                hashmap.insert(recipe_id, vec![link.into()]);
            }
        }
    });

    Ok(hashmap)
}

/// Fetches a recipe row only when it belongs to the user; a foreign or
/// absent id reads the same either way.
pub async fn get_recipe(
    id: Uuid,
    user_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<Option<Recipe>, Error> {
    let row: Option<Recipe> = sqlx::query_as("SELECT * FROM recipes WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .fetch_optional(&*pool)
        .await
        .map_err(|e| Error::from(QueryError::from(e)))?;

    Ok(row)
}

pub async fn list_recipe_tags(recipe_id: Uuid, pool: &Pool<Postgres>) -> Result<Vec<Tag>, Error> {
    let rows: Vec<Tag> = sqlx::query_as(
        "
        SELECT t.id AS id, t.user_id AS user_id, t.name AS name
        FROM recipe_tags_map m
        INNER JOIN recipe_tags t ON t.id = m.tag_id
        WHERE m.recipe_id = $1
        ORDER BY t.id
    ",
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await
    .map_err(|e| Error::from(QueryError::from(e)))?;

    Ok(rows)
}

pub async fn list_recipe_ingredients(
    recipe_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<Vec<Ingredient>, Error> {
    let rows: Vec<Ingredient> = sqlx::query_as(
        "
        SELECT i.id AS id, i.user_id AS user_id, i.name AS name
        FROM recipe_ingredients_map m
        INNER JOIN recipe_ingredients i ON i.id = m.ingredient_id
        WHERE m.recipe_id = $1
        ORDER BY i.id
    ",
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await
    .map_err(|e| Error::from(QueryError::from(e)))?;

    Ok(rows)
}

pub async fn get_recipe_detail(
    id: Uuid,
    user_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<Option<RecipeDetail>, Error> {
    let recipe = match get_recipe(id, user_id, pool).await? {
        Some(recipe) => recipe,
        None => return Ok(None),
    };

    let tags = list_recipe_tags(recipe.id, pool).await?;
    let ingredients = list_recipe_ingredients(recipe.id, pool).await?;

    Ok(Some(RecipeDetail::from_row(recipe, tags, ingredients)))
}

/// Creates a recipe with its nested tag and ingredient sets in one
/// transaction. Nested names are upserted per user.
pub async fn create_recipe(
    user_id: Uuid,
    title: String,
    time_minutes: i32,
    price: f64,
    description: String,
    link: String,
    tags: &[String],
    ingredients: &[String],
    pool: &Pool<Postgres>,
) -> Result<Uuid, Error> {
    let mut tr = pool
        .begin()
        .await
        .map_err(|_| Error::from(QueryError::new("Could not start transaction".to_owned())))?;

    let recipe: (Uuid,) = sqlx::query_as(
        "
        INSERT INTO recipes (user_id, title, time_minutes, price, description, link)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
    ",
    )
    .bind(user_id)
    .bind(title)
    .bind(time_minutes)
    .bind(price)
    .bind(description)
    .bind(link)
    .fetch_one(&mut *tr)
    .await
    .map_err(|e| Error::from(QueryError::from(e)))?;

    let recipe_id = recipe.0;

    replace_recipe_tags(&mut tr, recipe_id, user_id, tags).await?;
    replace_recipe_ingredients(&mut tr, recipe_id, user_id, ingredients).await?;

    tr.commit()
        .await
        .map_err(|_| Error::from(QueryError::new("Could not commit transaction".to_owned())))?;

    Ok(recipe_id)
}

/// Partially updates an owned recipe. A supplied tag or ingredient list
/// replaces the current set wholesale; an empty list clears it. The owner
/// is never part of the update.
pub async fn update_recipe(
    id: Uuid,
    user_id: Uuid,
    title: Option<String>,
    time_minutes: Option<i32>,
    price: Option<f64>,
    description: Option<String>,
    link: Option<String>,
    tags: Option<Vec<String>>,
    ingredients: Option<Vec<String>>,
    pool: &Pool<Postgres>,
) -> Result<(), Error> {
    let mut tr = pool
        .begin()
        .await
        .map_err(|_| Error::from(QueryError::new("Could not start transaction".to_owned())))?;

    let current: Option<Recipe> =
        sqlx::query_as("SELECT * FROM recipes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(&mut *tr)
            .await
            .map_err(|e| Error::from(QueryError::from(e)))?;

    let current = current.ok_or(Error::NotFound)?;

    sqlx::query(
        "
        UPDATE recipes
        SET title = $1, time_minutes = $2, price = $3, description = $4, link = $5
        WHERE id = $6
    ",
    )
    .bind(title.unwrap_or(current.title))
    .bind(time_minutes.unwrap_or(current.time_minutes))
    .bind(price.unwrap_or(current.price))
    .bind(description.unwrap_or(current.description))
    .bind(link.unwrap_or(current.link))
    .bind(id)
    .execute(&mut *tr)
    .await
    .map_err(|e| Error::from(QueryError::from(e)))?;

    if let Some(names) = tags {
        replace_recipe_tags(&mut tr, id, user_id, &names).await?;
    }
    if let Some(names) = ingredients {
        replace_recipe_ingredients(&mut tr, id, user_id, &names).await?;
    }

    tr.commit()
        .await
        .map_err(|_| Error::from(QueryError::new("Could not commit transaction".to_owned())))?;

    Ok(())
}

pub async fn delete_recipe(id: Uuid, user_id: Uuid, pool: &Pool<Postgres>) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM recipes WHERE id = $1 AND user_id = $2")
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

pub async fn set_recipe_image(
    id: Uuid,
    user_id: Uuid,
    image: &str,
    pool: &Pool<Postgres>,
) -> Result<(), Error> {
    let result = sqlx::query("UPDATE recipes SET image = $1 WHERE id = $2 AND user_id = $3")
        .bind(image)
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

async fn replace_recipe_tags(
    tr: &mut Transaction<'_, Postgres>,
    recipe_id: Uuid,
    user_id: Uuid,
    names: &[String],
) -> Result<(), Error> {
    sqlx::query("DELETE FROM recipe_tags_map WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(&mut **tr)
        .await
        .map_err(|e| Error::from(QueryError::from(e)))?;

    for name in names {
        let tag: (Uuid,) = sqlx::query_as(
            "
            INSERT INTO recipe_tags (user_id, name)
            VALUES ($1, $2)
            ON CONFLICT (user_id, name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id
        ",
        )
        .bind(user_id)
        .bind(name)
        .fetch_one(&mut **tr)
        .await
        .map_err(|e| Error::from(QueryError::from(e)))?;

        sqlx::query(
            "
            INSERT INTO recipe_tags_map (recipe_id, tag_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
        ",
        )
        .bind(recipe_id)
        .bind(tag.0)
        .execute(&mut **tr)
        .await
        .map_err(|e| Error::from(QueryError::from(e)))?;
    }

    Ok(())
}

async fn replace_recipe_ingredients(
    tr: &mut Transaction<'_, Postgres>,
    recipe_id: Uuid,
    user_id: Uuid,
    names: &[String],
) -> Result<(), Error> {
    sqlx::query("DELETE FROM recipe_ingredients_map WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(&mut **tr)
        .await
        .map_err(|e| Error::from(QueryError::from(e)))?;

    for name in names {
        let ingredient: (Uuid,) = sqlx::query_as(
            "
            INSERT INTO recipe_ingredients (user_id, name)
            VALUES ($1, $2)
            ON CONFLICT (user_id, name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id
        ",
        )
        .bind(user_id)
        .bind(name)
        .fetch_one(&mut **tr)
        .await
        .map_err(|e| Error::from(QueryError::from(e)))?;

        sqlx::query(
            "
            INSERT INTO recipe_ingredients_map (recipe_id, ingredient_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
        ",
        )
        .bind(recipe_id)
        .bind(ingredient.0)
        .execute(&mut **tr)
        .await
        .map_err(|e| Error::from(QueryError::from(e)))?;
    }

    Ok(())
}
