// ABOUTME: Session token generation and shape checks.
// ABOUTME: Tokens are 30 printable ASCII characters drawn from a cryptographically secure RNG.

use rand::RngCore;

/// Number of characters in every session token.
pub const TOKEN_LENGTH: usize = 30;

const FIRST_SYMBOL: u8 = b'!';
const SYMBOL_RANGE: u8 = 90;

/// Generate a fresh session token.
///
/// Each random byte maps to `'!' + b % 90`; quoting and escape characters are
/// swapped for harmless ones so the token can be pasted anywhere. Uniqueness
/// is probabilistic only.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_LENGTH];
    rand::rng().fill_bytes(&mut bytes);

    bytes
        .iter()
        .map(|b| match char::from(FIRST_SYMBOL + b % SYMBOL_RANGE) {
            '\\' => '_',
            '\'' => ':',
            '"' => 'y',
            '`' => '3',
            c => c,
        })
        .collect()
}

/// Whether `token` has the shape of a session token.
pub fn is_well_formed(token: &str) -> bool {
    token.chars().count() == TOKEN_LENGTH
}
