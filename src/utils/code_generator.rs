//! Short code generation and validation utilities.
//!
//! Codes are drawn uniformly from a 62-character alphabet using the operating
//! system's cryptographically secure random source.

use crate::domain::errors::LinkError;

/// Characters a short code is made of.
pub const ALPHABET: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Length of every generated short code.
pub const CODE_LENGTH: usize = 6;

/// Largest multiple of the alphabet size that fits in a byte. Bytes at or above
/// it are rejected so every character is equally likely.
const ACCEPT_BELOW: u8 = (256 / 62 * 62) as u8;

/// Generates a cryptographically secure random short code.
///
/// Uses `getrandom` for entropy and rejection sampling to map bytes onto
/// [`ALPHABET`] without modulo bias, producing a [`CODE_LENGTH`]-character code.
///
/// # Errors
///
/// Returns the `getrandom` error if the system random number generator fails.
/// Callers must not retry on it.
///
/// # Examples
///
/// ```ignore
/// let code = generate_code()?;
/// assert_eq!(code.len(), 6);
/// assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn generate_code() -> Result<String, getrandom::Error> {
    let mut code = String::with_capacity(CODE_LENGTH);
    let mut buffer = [0u8; 16];

    while code.len() < CODE_LENGTH {
        getrandom::fill(&mut buffer)?;

        for &byte in buffer.iter().filter(|&&b| b < ACCEPT_BELOW) {
            code.push(ALPHABET[usize::from(byte) % ALPHABET.len()] as char);
            if code.len() == CODE_LENGTH {
                break;
            }
        }
    }

    Ok(code)
}

/// Validates a short code received from a caller.
///
/// # Rules
///
/// - Not empty
/// - Exactly [`CODE_LENGTH`] characters
/// - Only characters from [`ALPHABET`]
///
/// # Errors
///
/// Returns [`LinkError::InvalidCode`] if any rule is violated.
pub fn validate_code(code: &str) -> Result<(), LinkError> {
    if code.is_empty() {
        return Err(LinkError::InvalidCode("missing short code".to_string()));
    }

    if code.len() != CODE_LENGTH {
        return Err(LinkError::InvalidCode(format!(
            "short code must be {} characters, got {}",
            CODE_LENGTH,
            code.len()
        )));
    }

    if !code.bytes().all(|b| ALPHABET.contains(&b)) {
        return Err(LinkError::InvalidCode(
            "short code can only contain letters and digits".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    #[test]
    fn test_alphabet_is_62_distinct_characters() {
        let unique: HashSet<_> = ALPHABET.iter().collect();
        assert_eq!(unique.len(), 62);
        assert_eq!(ACCEPT_BELOW, 248);
    }

    #[test]
    fn test_generate_code_has_correct_length() {
        let code = generate_code().unwrap();
        assert_eq!(code.len(), CODE_LENGTH);
    }

    #[test]
    fn test_generate_code_uses_alphabet() {
        for _ in 0..100 {
            let code = generate_code().unwrap();
            assert!(code.bytes().all(|b| ALPHABET.contains(&b)), "{code}");
        }
    }

    #[test]
    fn test_generate_code_produces_unique_codes() {
        let mut codes = HashSet::new();

        for _ in 0..1000 {
            codes.insert(generate_code().unwrap());
        }

        assert_eq!(codes.len(), 1000);
    }

    #[test]
    fn test_generate_code_covers_alphabet() {
        let mut seen: HashMap<char, usize> = HashMap::new();
        for _ in 0..2000 {
            for c in generate_code().unwrap().chars() {
                *seen.entry(c).or_default() += 1;
            }
        }
        // 12000 draws over 62 symbols, every symbol shows up.
        assert_eq!(seen.len(), 62);
    }

    #[test]
    fn test_generated_codes_pass_validation() {
        let code = generate_code().unwrap();
        assert!(validate_code(&code).is_ok());
    }

    #[test]
    fn test_validate_accepts_mixed_case_and_digits() {
        assert!(validate_code("aB3xY9").is_ok());
        assert!(validate_code("000000").is_ok());
        assert!(validate_code("ZZZZZZ").is_ok());
    }

    #[test]
    fn test_validate_empty_string() {
        let err = validate_code("").unwrap_err();
        assert!(err.to_string().contains("missing short code"));
    }

    #[test]
    fn test_validate_wrong_length() {
        assert!(validate_code("abc12").is_err());
        assert!(validate_code("abc1234").is_err());
        assert!(validate_code("nonexistent-code").is_err());
    }

    #[test]
    fn test_validate_special_characters() {
        assert!(validate_code("ab-123").is_err());
        assert!(validate_code("ab_123").is_err());
        assert!(validate_code("ab 123").is_err());
        assert!(validate_code("abç12").is_err());
    }
}
