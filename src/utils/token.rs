use rand::{rngs::OsRng, RngCore};

/// 32 random bytes rendered as 64 lowercase hex characters.
pub fn generate_public_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_token_is_64_hex_chars() {
        let token = generate_public_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_public_token());
    }
}
