//! Random password generation.
//!
//! Passwords are drawn uniformly from printable ASCII (`!` through `~`),
//! which covers upper- and lowercase letters, digits and symbols.
//! Selection uses rejection sampling over OS-RNG bytes so every
//! character of the alphabet is exactly equally likely.

use zeroize::Zeroizing;

use crate::crypto::fill_random;
use crate::errors::{NengPassError, Result};

/// The generator alphabet: `!` (0x21) through `~` (0x7E), 94 characters.
pub const ALPHABET: &[u8] = b"!\"#$%&'()*+,-./0123456789:;<=>?@\
ABCDEFGHIJKLMNOPQRSTUVWXYZ[\\]^_`abcdefghijklmnopqrstuvwxyz{|}~";

/// Bytes at or above this bound are discarded so `byte % 94` is uniform.
const REJECTION_BOUND: u8 = (256 - 256 % ALPHABET.len()) as u8;

/// Produces random passwords of a fixed length.
#[derive(Debug, Clone, Copy)]
pub struct PasswordGenerator {
    length: usize,
}

impl PasswordGenerator {
    pub fn new(length: usize) -> Self {
        Self { length }
    }

    /// The length every `generate` call produces.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Generate a password of the configured length.
    pub fn generate(&self) -> Result<Zeroizing<String>> {
        generate_with_length(self.length)
    }
}

/// Generate a password of exactly `length` characters.
///
/// Fails with `CryptoFailure` if the OS entropy source is unavailable.
pub fn generate_with_length(length: usize) -> Result<Zeroizing<String>> {
    if length == 0 {
        return Err(NengPassError::ConfigError(
            "generated password length must be at least 1".into(),
        ));
    }

    let mut password = Zeroizing::new(String::with_capacity(length));
    let mut pool = Zeroizing::new([0u8; 64]);

    while password.len() < length {
        fill_random(&mut pool[..])?;
        for &byte in pool.iter() {
            if byte >= REJECTION_BOUND {
                continue;
            }
            password.push(char::from(ALPHABET[usize::from(byte) % ALPHABET.len()]));
            if password.len() == length {
                break;
            }
        }
    }

    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alphabet_is_printable_ascii() {
        assert_eq!(ALPHABET.len(), 94);
        assert!(ALPHABET.iter().all(|b| (0x21..=0x7E).contains(b)));
        assert_eq!(REJECTION_BOUND, 188);
    }

    #[test]
    fn generates_requested_length() {
        let generator = PasswordGenerator::new(16);
        let pw = generator.generate().unwrap();
        assert_eq!(pw.chars().count(), 16);
        assert!(pw.bytes().all(|b| ALPHABET.contains(&b)));

        assert_eq!(generate_with_length(100).unwrap().len(), 100);
    }

    #[test]
    fn consecutive_passwords_differ() {
        let generator = PasswordGenerator::new(16);
        assert_ne!(*generator.generate().unwrap(), *generator.generate().unwrap());
    }

    #[test]
    fn zero_length_is_rejected() {
        assert!(generate_with_length(0).is_err());
    }

    #[test]
    fn covers_every_character_class() {
        // 4096 draws make a missing class astronomically unlikely.
        let pw = generate_with_length(4096).unwrap();
        assert!(pw.bytes().any(|b| b.is_ascii_uppercase()));
        assert!(pw.bytes().any(|b| b.is_ascii_lowercase()));
        assert!(pw.bytes().any(|b| b.is_ascii_digit()));
        assert!(pw.bytes().any(|b| b.is_ascii_punctuation()));
    }
}
