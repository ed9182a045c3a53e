use digest::Digest;
use md4::Md4;
use serde::{Deserialize, Serialize};

use crate::byte_helper::utf16_le_bytes;
use crate::util::crypto::NT_HASH_SIZE;

/// Account credential as supplied by the external store: the account name
/// and the opaque NT password hash. Read-only to this crate.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct User {
    pub username: String,
    pub nt_hash: [u8; NT_HASH_SIZE],
}

impl User {
    pub fn new(username: String, nt_hash: [u8; NT_HASH_SIZE]) -> Self {
        Self { username, nt_hash }
    }

    /// NTOWFv1: MD4 over the UTF-16LE password. For stores that hold
    /// plaintext secrets.
    pub fn from_password(username: String, password: &str) -> Self {
        let nt_hash = Md4::digest(utf16_le_bytes(password)).into();
        Self { username, nt_hash }
    }
}
