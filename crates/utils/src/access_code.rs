//! Customer access codes: short, human-typeable secrets handed out once per job.

use rand::Rng;

/// Uppercase letters and digits without the look-alikes `I`, `O`, `0` and `1`.
pub const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
pub const CODE_LENGTH: usize = 8;

pub fn generate() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Customers type codes by hand, so case and surrounding whitespace are ignored.
pub fn normalize(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}
