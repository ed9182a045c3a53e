use crate::error::SMBSecurityResult;
use crate::util::crypto::preauth::{calc_preauth_integrity_hash, PreauthIntegrityHashId};
use crate::util::crypto::secmech::SecMech;
use crate::util::crypto::SHA512_SIZE;

/// Per-session snapshot of the preauth integrity hash.
///
/// SMB 3.1.1 continues hashing session-setup messages into a copy of the
/// connection hash taken when the session-setup exchange starts, so that
/// several sessions can be set up over one connection without disturbing
/// each other's values.
pub struct SMBPreauthSession {
    session_id: u64,
    hash_value: [u8; SHA512_SIZE],
}

impl SMBPreauthSession {
    pub fn new(session_id: u64, hash_value: [u8; SHA512_SIZE]) -> Self {
        Self {
            session_id,
            hash_value,
        }
    }

    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    pub fn hash_value(&self) -> &[u8; SHA512_SIZE] {
        &self.hash_value
    }

    /// Folds one framed session-setup PDU into this session's hash.
    pub fn update(
        &mut self,
        secmech: &mut SecMech,
        hash_id: PreauthIntegrityHashId,
        buf: &[u8],
    ) -> SMBSecurityResult<()> {
        self.hash_value =
            calc_preauth_integrity_hash(secmech, hash_id, buf, &self.hash_value)?;
        Ok(())
    }
}
