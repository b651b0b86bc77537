//! Per-session form tokens for the dashboard's POST endpoints.

use actix_session::Session;
use rand::Rng;

use crate::errors::AppError;

const TOKEN_KEY: &str = "csrf_token";
const TOKEN_BYTES: usize = 32;

/// The session's form token, minted on first use.
pub fn get_or_create_token(session: &Session) -> String {
    match session.get::<String>(TOKEN_KEY) {
        Ok(Some(token)) if !token.is_empty() => token,
        _ => {
            let token = random_hex(TOKEN_BYTES);
            if let Err(e) = session.insert(TOKEN_KEY, &token) {
                log::warn!("Could not store form token in session: {e}");
            }
            token
        }
    }
}

/// Reject a form post whose token does not match the session's.
pub fn validate_csrf(session: &Session, submitted: &str) -> Result<(), AppError> {
    match session.get::<String>(TOKEN_KEY) {
        Ok(Some(stored)) if !stored.is_empty() && constant_time_eq(&stored, submitted) => Ok(()),
        _ => {
            log::warn!("Rejected dashboard form post with a bad token");
            Err(AppError::Csrf)
        }
    }
}

/// `len` random bytes, hex encoded.
pub(crate) fn random_hex(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::rng().fill(bytes.as_mut_slice());
    hex::encode(bytes)
}

/// Equality that does not stop at the first differing byte.
pub(crate) fn constant_time_eq(a: &str, b: &str) -> bool {
    a.len() == b.len() && a.bytes().zip(b.bytes()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_hex_of_requested_length() {
        let a = random_hex(TOKEN_BYTES);
        assert_eq!(a.len(), TOKEN_BYTES * 2);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, random_hex(TOKEN_BYTES));
        assert_eq!(random_hex(8).len(), 16);
    }

    #[test]
    fn comparison_requires_exact_match() {
        assert!(constant_time_eq("abc", "abc"));
        assert!(!constant_time_eq("abc", "abd"));
        assert!(!constant_time_eq("abc", "abcd"));
    }
}
