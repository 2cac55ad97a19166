//! Short code generation.
//!
//! Codes are drawn uniformly, with replacement, from a fixed 62-symbol
//! alphabet. Entropy does not guarantee uniqueness; the caller checks each
//! candidate against storage.

use crate::error::AppError;
use rand::Rng;

/// The 62 symbols a short code may contain.
pub const ALPHABET: &[u8; 62] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Source of candidate short codes.
///
/// Abstracted so the engine can be driven with deterministic codes in tests.
pub trait CodeGenerator: Send + Sync {
    /// Produces a code of exactly `length` characters.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidLength`] when `length` is zero.
    fn generate(&self, length: usize) -> Result<String, AppError>;
}

/// Generator backed by the thread-local RNG. Not cryptographically secure.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomCodeGenerator;

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self, length: usize) -> Result<String, AppError> {
        generate_code(length)
    }
}

/// Generates a random code of `length` symbols from [`ALPHABET`].
///
/// # Errors
///
/// Returns [`AppError::InvalidLength`] when `length` is zero.
///
/// # Examples
///
/// ```
/// use link_shortener::utils::code_generator::generate_code;
///
/// let code = generate_code(8).unwrap();
/// assert_eq!(code.len(), 8);
/// assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn generate_code(length: usize) -> Result<String, AppError> {
    if length == 0 {
        return Err(AppError::InvalidLength);
    }

    let mut rng = rand::rng();
    let code = (0..length)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect();

    Ok(code)
}

/// Returns true if every character of `code` belongs to [`ALPHABET`].
pub fn is_valid_code(code: &str) -> bool {
    !code.is_empty() && code.bytes().all(|b| b.is_ascii_alphanumeric())
}
