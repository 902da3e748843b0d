use serde::Serialize;

pub type Uuid = i32;

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub name: String,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub name: String,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ingredient {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub name: String,
}

/// Full recipe row, backing the detail endpoint.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct Recipe {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub title: String,
    pub time_minutes: i32,
    pub price: f64,
    pub description: String,
    pub link: String,
    pub image: Option<String>,
}

/// Slim recipe row for listings; carries no description or image.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct RecipeRow {
    pub id: Uuid,
    pub title: String,
    pub time_minutes: i32,
    pub price: f64,
    pub link: String,
}

/// A tag row joined through the recipe map table.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct LinkedTag {
    pub recipe_id: Uuid,
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
}

impl From<LinkedTag> for Tag {
    fn from(row: LinkedTag) -> Self {
        Tag {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
        }
    }
}

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct LinkedIngredient {
    pub recipe_id: Uuid,
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
}

impl From<LinkedIngredient> for Ingredient {
    fn from(row: LinkedIngredient) -> Self {
        Ingredient {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecipeSummary {
    pub id: Uuid,
    pub title: String,
    pub time_minutes: i32,
    pub price: f64,
    pub link: String,
    pub tags: Vec<Tag>,
    pub ingredients: Vec<Ingredient>,
}

impl RecipeSummary {
    pub fn from_row(row: RecipeRow, tags: Vec<Tag>, ingredients: Vec<Ingredient>) -> Self {
        Self {
            id: row.id,
            title: row.title,
            time_minutes: row.time_minutes,
            price: row.price,
            link: row.link,
            tags,
            ingredients,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecipeDetail {
    pub id: Uuid,
    pub title: String,
    pub time_minutes: i32,
    pub price: f64,
    pub description: String,
    pub link: String,
    pub image: Option<String>,
    pub tags: Vec<Tag>,
    pub ingredients: Vec<Ingredient>,
}

impl RecipeDetail {
    pub fn from_row(row: Recipe, tags: Vec<Tag>, ingredients: Vec<Ingredient>) -> Self {
        Self {
            id: row.id,
            title: row.title,
            time_minutes: row.time_minutes,
            price: row.price,
            description: row.description,
            link: row.link,
            image: row.image,
            tags,
            ingredients,
        }
    }
}
