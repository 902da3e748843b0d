use crate::{
    authentication::{
        cryptography::{hash_password, verify_password},
        jwt::generate_jwt_session,
    },
    error::{Error, QueryError},
    schema::User,
};

use sqlx::{Pool, Postgres};

/// Lowercases the domain half of an address, leaving the local part as
/// the user typed it. Addresses without an `@` are kept as given.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();

    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => email.to_string(),
    }
}

pub async fn get_user(pool: &Pool<Postgres>, email: &str) -> Result<Option<User>, Error> {
    let row: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(&*pool)
        .await
        .map_err(|e| Error::from(QueryError::from(e)))?;

    Ok(row)
}

pub async fn get_user_by_id(pool: &Pool<Postgres>, user_id: i32) -> Result<Option<User>, Error> {
    let row: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&*pool)
        .await
        .map_err(|e| Error::from(QueryError::from(e)))?;

    Ok(row)
}

/// Creates a user from a raw email and password. The email is normalized
/// before it is stored and the password is stored as an argon2 hash.
pub async fn create_user(
    email: &str,
    password: &str,
    name: &str,
    pool: &Pool<Postgres>,
) -> Result<User, Error> {
    let email = normalize_email(email);
    if email.is_empty() {
        return Err(Error::Validation(String::from("email must not be blank")));
    }
    if password.is_empty() {
        return Err(Error::Validation(String::from("password must not be blank")));
    }

    let hash = hash_password(password.to_string())
        .map_err(|_| Error::Internal(String::from("failed to hash password")))?;

    let row: Option<User> = sqlx::query_as(
        "
        INSERT INTO users (email, password, name)
        VALUES ($1, $2, $3)
        ON CONFLICT DO NOTHING RETURNING *;
    ",
    )
    .bind(&email)
    .bind(hash)
    .bind(name)
    .fetch_optional(&*pool)
    .await
    .map_err(|e| Error::from(QueryError::from(e)))?;

    match row {
        Some(user) => Ok(user),
        None => Err(Error::Validation(String::from(
            "user with this email already exists",
        ))),
    }
}

/// Exchanges valid credentials for a signed session token.
pub async fn login_user(
    email: &str,
    password: &str,
    secret: &[u8],
    pool: &Pool<Postgres>,
) -> Result<String, Error> {
    let email = normalize_email(email);
    let user = match get_user(pool, &email).await? {
        Some(user) => user,
        None => return Err(Error::Validation(String::from("invalid credentials"))),
    };

    let authenticated = verify_password(password, &user.password)
        .map_err(|_| Error::Internal(String::from("failed to verify password")))?;
    if !authenticated {
        return Err(Error::Validation(String::from("invalid credentials")));
    }

    generate_jwt_session(&user, secret)
}

/// Updates the caller's own profile. A new password is re-hashed; an empty
/// one is rejected the same way registration rejects it.
pub async fn update_user(
    user_id: i32,
    name: Option<String>,
    password: Option<String>,
    pool: &Pool<Postgres>,
) -> Result<User, Error> {
    let current = get_user_by_id(pool, user_id).await?.ok_or(Error::NotFound)?;

    let name = name.unwrap_or(current.name);
    let password = match password {
        Some(password) => {
            if password.is_empty() {
                return Err(Error::Validation(String::from("password must not be blank")));
            }
            hash_password(password)
                .map_err(|_| Error::Internal(String::from("failed to hash password")))?
        }
        None => current.password,
    };

    let row: User = sqlx::query_as(
        "UPDATE users SET name = $1, password = $2 WHERE id = $3 RETURNING *",
    )
    .bind(name)
    .bind(password)
    .bind(user_id)
    .fetch_one(&*pool)
    .await
    .map_err(|e| Error::from(QueryError::from(e)))?;

    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::normalize_email;

    #[test]
    fn normalizes_domain_casing_only() {
        let samples = [
            ("test1@EXAMPle.com", "test1@example.com"),
            ("Test2@EXAMPle.com", "Test2@example.com"),
            ("TEST3@EXAMPLE.COM", "TEST3@example.com"),
            ("test4@example.com", "test4@example.com"),
        ];

        for (raw, expected) in samples {
            assert_eq!(normalize_email(raw), expected);
        }
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(normalize_email("  user@Example.Com "), "user@example.com");
    }

    #[test]
    fn keeps_addresses_without_domain_untouched() {
        assert_eq!(normalize_email("Postmaster"), "Postmaster");
    }
}
