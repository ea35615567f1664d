//! Random password generation.

use rand::Rng;

/// Length of every generated password.
pub const PASSWORD_LENGTH: usize = 16;

/// Characters a generated password is drawn from.
pub const PASSWORD_CHARSET: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Generate a password with the thread-local RNG.
pub fn generate_password() -> String {
    generate_password_with(&mut rand::thread_rng())
}

/// Generate a password, drawing each position uniformly and independently
/// from [`PASSWORD_CHARSET`].
pub fn generate_password_with<R: Rng>(rng: &mut R) -> String {
    let charset = PASSWORD_CHARSET.as_bytes();
    (0..PASSWORD_LENGTH)
        .map(|_| charset[rng.gen_range(0..charset.len())] as char)
        .collect()
}
