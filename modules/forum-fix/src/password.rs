use forum_common::{ForumAdminError, Result};

/// Matches the cost the forum server uses when registering accounts.
pub const BCRYPT_COST: u32 = 10;

pub const MIN_PASSWORD_LEN: usize = 6;

/// bcrypt only looks at the first 72 bytes.
pub const MAX_PASSWORD_BYTES: usize = 72;

pub fn validate(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ForumAdminError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(ForumAdminError::Validation(format!(
            "password must be at most {MAX_PASSWORD_BYTES} bytes"
        )));
    }
    Ok(())
}

/// Validate and hash a new password for storage in `users.password`.
pub fn hash(password: &str) -> Result<String> {
    validate(password)?;
    bcrypt::hash(password, BCRYPT_COST)
        .map_err(|e| ForumAdminError::Anyhow(anyhow::anyhow!("bcrypt hash failed: {e}")))
}

pub fn verify(password: &str, stored_hash: &str) -> bool {
    bcrypt::verify(password, stored_hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_not_the_plaintext() {
        let h = hash("correct horse").unwrap();
        assert_ne!(h, "correct horse");
        assert!(!h.contains("correct horse"));
        assert!(h.starts_with("$2"));
        assert!(verify("correct horse", &h));
        assert!(!verify("wrong horse", &h));
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash("same-password").unwrap();
        let b = hash("same-password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn uses_server_cost() {
        let h = hash("abcdef").unwrap();
        // $2b$10$...
        assert_eq!(&h[4..6], "10");
    }

    #[test]
    fn rejects_short_passwords() {
        let err = hash("12345").unwrap_err();
        assert!(matches!(err, ForumAdminError::Validation(_)));
    }

    #[test]
    fn rejects_passwords_bcrypt_would_truncate() {
        let long = "a".repeat(73);
        assert!(validate(&long).is_err());
        assert!(validate(&"a".repeat(72)).is_ok());
    }

    #[test]
    fn verify_tolerates_garbage_hashes() {
        assert!(!verify("anything", "not-a-bcrypt-hash"));
    }
}
