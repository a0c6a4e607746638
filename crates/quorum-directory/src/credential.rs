//! Initial credential generation for newly provisioned accounts
//!
//! New directory accounts get a random throwaway credential the user never
//! sees (they are forced to set their own on first sign-in), so the only
//! requirements are entropy and the directory's character-class rules.

use rand::seq::SliceRandom;
use rand::Rng;

const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";

/// Generate a random credential containing exactly `lowercase` lowercase
/// letters, `uppercase` uppercase letters, and `digits` digits, shuffled.
pub fn generate_initial_credential(lowercase: usize, uppercase: usize, digits: usize) -> String {
    let mut rng = rand::thread_rng();
    let mut chars = Vec::with_capacity(lowercase + uppercase + digits);

    for _ in 0..lowercase {
        chars.push(LOWERCASE[rng.gen_range(0..LOWERCASE.len())]);
    }
    for _ in 0..uppercase {
        chars.push(UPPERCASE[rng.gen_range(0..UPPERCASE.len())]);
    }
    for _ in 0..digits {
        chars.push(DIGITS[rng.gen_range(0..DIGITS.len())]);
    }

    chars.shuffle(&mut rng);
    chars.into_iter().map(|c| c as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_length() {
        let credential = generate_initial_credential(10, 10, 10);
        assert_eq!(credential.len(), 30);
    }

    #[test]
    fn test_credential_class_counts() {
        let credential = generate_initial_credential(10, 10, 10);
        assert_eq!(
            credential.chars().filter(|c| c.is_ascii_lowercase()).count(),
            10
        );
        assert_eq!(
            credential.chars().filter(|c| c.is_ascii_uppercase()).count(),
            10
        );
        assert_eq!(
            credential.chars().filter(|c| c.is_ascii_digit()).count(),
            10
        );
    }

    #[test]
    fn test_credentials_are_unique() {
        let a = generate_initial_credential(10, 10, 10);
        let b = generate_initial_credential(10, 10, 10);
        assert_ne!(a, b);
    }
}
