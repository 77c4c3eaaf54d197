#![forbid(unsafe_code)]

use rand::Rng;

const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

pub const SHORT_ID_LEN: usize = 4;

/// Short random task id, unique only in practice within one day record;
/// collisions are not checked.
pub fn short_id() -> String {
    short_id_with_len(SHORT_ID_LEN)
}

pub fn short_id_with_len(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}
