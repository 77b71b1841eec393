use rand::Rng;
use uuid::Uuid;

/// Length of the organizer code
pub const CODE_LENGTH: usize = 6;

/// Length of the public share id
pub const SHARE_ID_LENGTH: usize = 8;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Draw a 6-character organizer code from `A-Z0-9`
///
/// Uniqueness is not checked here. The registry rejects a colliding code and
/// the caller re-rolls.
pub fn generate_unique_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Short opaque token for public registration links
pub fn generate_share_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(SHARE_ID_LENGTH);
    id
}

/// Whether `code` has the shape of an organizer code
pub fn is_valid_code(code: &str) -> bool {
    code.len() == CODE_LENGTH
        && code
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}
