//! Random watermark payloads.

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Shortest generated payload.
pub const MIN_TEXT_LEN: usize = 5;

/// Longest generated payload.
pub const MAX_TEXT_LEN: usize = 25;

/// Generate a random `[A-Za-z0-9]` string with a length drawn uniformly from
/// `[MIN_TEXT_LEN, MAX_TEXT_LEN]`.
pub fn random_text<R: Rng + ?Sized>(rng: &mut R) -> String {
    let len = rng.gen_range(MIN_TEXT_LEN..=MAX_TEXT_LEN);
    random_text_of_len(rng, len)
}

/// Generate a random `[A-Za-z0-9]` string of exactly `len` characters.
pub fn random_text_of_len<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| char::from(rng.sample(Alphanumeric)))
        .collect()
}
