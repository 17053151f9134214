use anyhow::Context;
use tracing::error;

pub fn hash_password(plain: &str, cost: u32) -> anyhow::Result<String> {
    bcrypt::hash(plain, cost).map_err(|e| {
        error!(error = %e, "bcrypt hash error");
        anyhow::Error::new(e).context("bcrypt hash")
    })
}

/// A malformed stored hash is an error, not a mismatch.
pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    bcrypt::verify(plain, hash).map_err(|e| {
        error!(error = %e, "bcrypt verify error");
        anyhow::Error::new(e).context("bcrypt verify")
    })
}

/// Runs `hash_password` on the blocking pool.
pub async fn hash_password_blocking(plain: String, cost: u32) -> anyhow::Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&plain, cost))
        .await
        .context("hash task failed")?
}

/// Runs `verify_password` on the blocking pool.
pub async fn verify_password_blocking(plain: String, hash: String) -> anyhow::Result<bool> {
    tokio::task::spawn_blocking(move || verify_password(&plain, &hash))
        .await
        .context("verify task failed")?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_BCRYPT_COST;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password, DEFAULT_BCRYPT_COST).expect("hashing should succeed");
        assert!(hash.starts_with("$2b$12$"));
        assert!(verify_password(password, &hash).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let password = "correct-horse-battery-staple";
        let hash = hash_password(password, 4).expect("hashing should succeed");
        assert!(!verify_password("wrong-password", &hash).expect("verify should not error"));
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("secret123", 4).unwrap();
        let b = hash_password("secret123", 4).unwrap();
        assert_ne!(a, b);
        assert!(verify_password("secret123", &a).unwrap());
        assert!(verify_password("secret123", &b).unwrap());
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let err = verify_password("anything", "not-a-valid-hash").unwrap_err();
        assert_eq!(err.to_string(), "bcrypt verify");
        assert!(err.downcast_ref::<bcrypt::BcryptError>().is_some());
    }

    #[test]
    fn rejects_invalid_cost() {
        let err = hash_password("secret123", 3).unwrap_err();
        assert_eq!(err.to_string(), "bcrypt hash");
        assert!(err.downcast_ref::<bcrypt::BcryptError>().is_some());
    }

    #[tokio::test]
    async fn blocking_wrappers_agree_with_sync_versions() {
        let hash = hash_password_blocking("secret123".into(), 4).await.unwrap();
        assert!(verify_password_blocking("secret123".into(), hash.clone()).await.unwrap());
        assert!(!verify_password_blocking("secret124".into(), hash).await.unwrap());
    }
}
