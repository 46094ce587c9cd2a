//! High-entropy identifiers drawn from the operating system RNG.

use base64ct::Base64UrlUnpadded;
use base64ct::Encoding;
use rand::rngs::OsRng;
use rand::RngCore;

/// Entropy of an access token id (`jti`), in bytes.
pub const TOKEN_ID_BYTES: usize = 16;

/// Entropy of a refresh handle, in bytes.
pub const REFRESH_HANDLE_BYTES: usize = 32;

/// Generate `len` random bytes encoded as unpadded URL-safe base64.
pub fn random_string(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    Base64UrlUnpadded::encode_string(&bytes)
}

/// 128-bit token identifier.
pub fn token_id() -> String {
    random_string(TOKEN_ID_BYTES)
}

/// 256-bit opaque refresh handle.
pub fn refresh_handle() -> String {
    random_string(REFRESH_HANDLE_BYTES)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_lengths() {
        // 16 bytes -> 22 chars, 32 bytes -> 43 chars without padding
        assert_eq!(token_id().len(), 22);
        assert_eq!(refresh_handle().len(), 43);
    }

    #[test]
    fn test_url_safe_alphabet() {
        let handle = refresh_handle();
        assert!(handle
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_no_collisions_in_sample() {
        let sample: HashSet<String> = (0..1000).map(|_| refresh_handle()).collect();
        assert_eq!(sample.len(), 1000);
    }
}
