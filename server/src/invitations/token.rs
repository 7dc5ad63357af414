//! Invitation link credentials.

use rand::{rngs::OsRng, RngCore};

/// Number of random bytes behind every invitation token.
pub const INVITATION_TOKEN_BYTES: usize = 32;

/// Generates an opaque, unguessable link token: 32 bytes from the OS CSPRNG,
/// lowercase hex. Nothing about the recipient is encoded in it.
pub fn generate_invitation_token() -> String {
    let mut bytes = [0_u8; INVITATION_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Cheap shape check done before touching the store.
pub fn is_well_formed(token: &str) -> bool {
    token.len() == INVITATION_TOKEN_BYTES * 2 && token.bytes().all(|b| b.is_ascii_hexdigit())
}
