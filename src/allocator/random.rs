use rand::Rng;

/// Characters a random token is drawn from.
pub const TOKEN_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Uniform uppercase alphanumeric token of `length` characters.
pub fn random_token<R: Rng>(rng: &mut R, length: usize) -> String {
    (0..length)
        .map(|_| char::from(TOKEN_ALPHABET[rng.gen_range(0..TOKEN_ALPHABET.len())]))
        .collect()
}
