use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

pub fn hash_password(password: String) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    Ok(argon2
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

pub fn verify_password(
    password: &str,
    password_hash: &str,
) -> Result<bool, argon2::password_hash::Error> {
    let argon2 = Argon2::default();
    let parsed_hash = PasswordHash::new(password_hash)?;

    Ok(argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::{hash_password, verify_password};

    #[test]
    fn hash_verifies_original_password() {
        let hash = hash_password(String::from("testpass123")).unwrap();

        assert_ne!(hash, "testpass123");
        assert!(verify_password("testpass123", &hash).unwrap());
    }

    #[test]
    fn hash_rejects_other_passwords() {
        let hash = hash_password(String::from("testpass123")).unwrap();

        assert!(!verify_password("testpass124", &hash).unwrap());
        assert!(!verify_password("", &hash).unwrap());
    }
}
