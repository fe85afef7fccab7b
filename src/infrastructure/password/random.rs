//! Random password generation
//!
//! Each output character is picked from a 62-symbol alphabet using a rolling
//! shift seeded by the first random byte, so no single byte maps straight to
//! a fixed symbol.

use rand::RngCore;
use rand::rngs::OsRng;

/// Lowercase, uppercase, then digits
pub const PASSWORD_ALPHABET: &[u8; 62] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Default length of generated passwords
pub const DEFAULT_PASSWORD_LENGTH: usize = 8;

/// Generate a random password from the operating system's CSPRNG
pub fn gen_random_password(length: usize) -> String {
    gen_random_password_with(&mut OsRng, length)
}

/// Generate a random password from an arbitrary byte source
///
/// Draws `length + 1` bytes. Output is a pure function of that byte stream.
pub fn gen_random_password_with<R: RngCore + ?Sized>(rng: &mut R, length: usize) -> String {
    let base = PASSWORD_ALPHABET.len();
    let mut random = vec![0u8; length + 1];
    rng.fill_bytes(&mut random);

    let mut bytes = random.iter().map(|b| usize::from(*b));
    // Reducing the shift modulo the base leaves every pick unchanged.
    let mut shift = bytes.next().unwrap_or_default() % base;
    let mut password = String::with_capacity(length);

    for byte in bytes {
        password.push(char::from(PASSWORD_ALPHABET[(shift + byte) % base]));
        shift = (shift + byte) % base;
    }

    password
}
