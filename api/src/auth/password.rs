use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of the password.
///
/// Unsalted and fast: the store compares digests directly, so the same input
/// must always produce the same output. Not suitable against offline attacks.
pub fn hash_password(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        assert_eq!(
            hash_password("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_deterministic_and_distinct() {
        assert_eq!(hash_password("p1"), hash_password("p1"));
        assert_ne!(hash_password("p1"), hash_password("p2"));
        assert_eq!(hash_password("").len(), 64);
    }
}
