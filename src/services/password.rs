//! Password hashing helpers (bcrypt)

use bcrypt::{DEFAULT_COST, hash, verify};

#[derive(Debug)]
pub struct PasswordError(String);

impl std::fmt::Display for PasswordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Password hashing error: {}", self.0)
    }
}

/// Hash a plaintext password for storage
pub fn hash_password(plain: &str) -> Result<String, PasswordError> {
    hash(plain, DEFAULT_COST).map_err(|e| PasswordError(e.to_string()))
}

/// Check a plaintext password against a stored hash. Malformed hashes
/// count as a mismatch rather than an error.
pub fn verify_password(plain: &str, hashed: &str) -> bool {
    verify(plain, hashed).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        // low cost to keep the test fast
        let hashed = bcrypt::hash("hunter2", 4).unwrap();
        assert!(verify_password("hunter2", &hashed));
        assert!(!verify_password("hunter3", &hashed));
    }

    #[test]
    fn test_malformed_hash_is_mismatch() {
        assert!(!verify_password("hunter2", "not-a-bcrypt-hash"));
    }
}
