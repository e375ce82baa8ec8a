//! String value generator.
//!
//! Characters are drawn one at a time, uniformly over the alphabet plus a
//! terminator outcome, until the terminator comes up. Lengths are therefore
//! geometric with mean `ALPHABET.len()`.

use rand::distr::{Distribution, Uniform};
use rand::Rng;

/// Printable characters a generated string may contain.
pub const ALPHABET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^&*()-=_+[]{}|;':,.<>/? \t";

/// Generate a string. `choice` must be uniform over `0..=ALPHABET.len()`;
/// the last outcome ends the string.
pub fn generate_string<R: Rng>(rng: &mut R, choice: &Uniform<usize>) -> String {
    let mut out = String::new();
    while let Some(&byte) = ALPHABET.get(choice.sample(rng)) {
        out.push(char::from(byte));
    }
    out
}
