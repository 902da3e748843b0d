use serde::Deserialize;

use crate::error::Error;
use crate::schema::Uuid;

/// A nested tag or ingredient entry as it appears in recipe payloads.
#[derive(Debug, Clone, Deserialize)]
pub struct NamedEntry {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateRecipeForm {
    pub title: String,
    pub time_minutes: i32,
    pub price: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<NamedEntry>>,
    #[serde(default)]
    pub ingredients: Option<Vec<NamedEntry>>,
}

/// Update payload; absent fields keep their stored values. There is
/// deliberately no owner field here: unknown members are dropped during
/// deserialization, so an attempted owner change is a no-op.
#[derive(Debug, Deserialize)]
pub struct UpdateRecipeForm {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub time_minutes: Option<i32>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<NamedEntry>>,
    #[serde(default)]
    pub ingredients: Option<Vec<NamedEntry>>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterUserForm {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TokenForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RenameForm {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct RecipeListQuery {
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub ingredients: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegistryListQuery {
    #[serde(default)]
    pub assigned_only: Option<i32>,
}

impl RegistryListQuery {
    pub fn assigned_only(&self) -> bool {
        self.assigned_only.unwrap_or(0) != 0
    }
}

pub fn entry_names(entries: &[NamedEntry]) -> Vec<String> {
    entries.iter().map(|entry| entry.name.to_owned()).collect()
}

/// Parses a comma-separated id set, e.g. `?tags=1,2,3`.
pub fn parse_id_set(raw: &str) -> Result<Vec<Uuid>, Error> {
    let ids = raw
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<Uuid>()
                .map_err(|_| Error::Validation(format!("invalid id in filter: {part:?}")))
        })
        .collect::<Result<Vec<Uuid>, Error>>()?;

    if ids.is_empty() {
        return Err(Error::Validation(String::from("empty id filter")));
    }

    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::parse_id_set;

    #[test]
    fn parses_comma_separated_ids() {
        assert_eq!(parse_id_set("1,2,3").unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_id_set("7").unwrap(), vec![7]);
        assert_eq!(parse_id_set(" 1 , 2 ").unwrap(), vec![1, 2]);
    }

    #[test]
    fn rejects_garbage_entries() {
        assert!(parse_id_set("1,x").is_err());
        assert!(parse_id_set("abc").is_err());
    }

    #[test]
    fn rejects_an_empty_set() {
        assert!(parse_id_set("").is_err());
        assert!(parse_id_set(",,").is_err());
    }
}
