use anyhow::{anyhow, bail};
use argon2::{
    password_hash::{PasswordHash, PasswordVerifier},
    Argon2,
};
use tracing::error;

/// bcrypt work factor for new hashes. Tests use the minimum so router tests stay fast.
#[cfg(not(test))]
const BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;
#[cfg(test)]
const BCRYPT_COST: u32 = 4;

/// Hashes a new password with bcrypt (`$2b$` modular crypt format).
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    bcrypt::hash(plain, BCRYPT_COST).map_err(|e| {
        error!(error = %e, "bcrypt hash failed");
        anyhow!(e)
    })
}

/// Checks `plain` against a stored hash. bcrypt is the current scheme;
/// argon2 PHC strings written by earlier builds still verify.
pub fn verify_password(plain: &str, stored: &str) -> anyhow::Result<bool> {
    if stored.starts_with("$2a$") || stored.starts_with("$2b$") || stored.starts_with("$2y$") {
        return bcrypt::verify(plain, stored).map_err(|e| anyhow!("malformed bcrypt hash: {e}"));
    }
    if stored.starts_with("$argon2") {
        let parsed =
            PasswordHash::new(stored).map_err(|e| anyhow!("malformed argon2 hash: {e}"))?;
        return Ok(Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok());
    }
    bail!("unrecognised password hash scheme")
}

/// bcrypt is CPU-bound; keep it off the async workers.
pub async fn hash_password_blocking(plain: String) -> anyhow::Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&plain)).await?
}

pub async fn verify_password_blocking(plain: String, hash: String) -> anyhow::Result<bool> {
    tokio::task::spawn_blocking(move || verify_password(&plain, &hash)).await?
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::password_hash::{PasswordHasher, SaltString};
    use rand::rngs::OsRng;

    #[test]
    fn new_hashes_are_bcrypt() {
        let hash = hash_password("pages-of-a-life").unwrap();
        assert!(hash.starts_with("$2b$"));
        assert!(verify_password("pages-of-a-life", &hash).unwrap());
        assert!(!verify_password("pages-of-a-lie", &hash).unwrap());
    }

    #[test]
    fn accepts_2a_and_2y_prefixes() {
        let hash = bcrypt::hash("old-client", 4).unwrap();
        for prefix in ["$2a$", "$2y$"] {
            let variant = format!("{prefix}{}", &hash[4..]);
            assert!(verify_password("old-client", &variant).unwrap(), "{prefix}");
        }
    }

    #[test]
    fn argon2_hashes_still_verify() {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(b"from-an-older-build", &salt)
            .unwrap()
            .to_string();
        assert!(verify_password("from-an-older-build", &hash).unwrap());
        assert!(!verify_password("something-else", &hash).unwrap());
    }

    #[test]
    fn unknown_or_broken_hashes_error() {
        assert!(verify_password("anything", "not-a-valid-hash").is_err());
        assert!(verify_password("anything", "$2b$10$tooshort").is_err());
        assert!(verify_password("anything", "$argon2id$garbage").is_err());
    }

    #[tokio::test]
    async fn blocking_wrappers_agree() {
        let hash = hash_password_blocking("diary-password".into()).await.unwrap();
        assert!(verify_password_blocking("diary-password".into(), hash.clone()).await.unwrap());
        assert!(!verify_password_blocking("other".into(), hash).await.unwrap());
    }
}
