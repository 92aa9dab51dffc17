pub mod catalogue;
pub mod content;
pub mod custom_request;
pub mod settings;

use rand::Rng;
use rand::distr::Alphanumeric;

/// `len` random characters from `[A-Z0-9]`, used for generated public codes.
pub fn random_code(len: usize) -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(len)
        .map(|b| (b as char).to_ascii_uppercase())
        .collect()
}
