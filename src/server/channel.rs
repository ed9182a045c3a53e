use crate::error::SMBSecurityResult;
use crate::protocol::dialect::SMBDialect;
use crate::server::session::SessionKey;
use crate::util::crypto::secmech::SecMech;
use crate::util::crypto::signing::{compute_signing_key, sign_smb3};
use crate::util::crypto::{CMAC_AES_SIZE, SHA512_SIZE};

/// One transport binding of an SMB3 session.
///
/// Each channel derives its own signing key at bind time and carries its own
/// primitive contexts, so concurrent channels of one session never share
/// mutable crypto state.
pub struct SMBChannel {
    signing_key: [u8; CMAC_AES_SIZE],
    secmech: SecMech,
}

impl core::fmt::Debug for SMBChannel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SMBChannel").finish_non_exhaustive()
    }
}

impl SMBChannel {
    /// Derives the channel signing key from the session key. For SMB 3.1.1
    /// the preauth hash at the time of binding is folded into the
    /// derivation; earlier SMB3 dialects use the fixed derivation context
    /// and pre-3.0 dialects take the session key head unchanged.
    pub fn bind(
        session_key: &SessionKey,
        dialect: SMBDialect,
        preauth_hash: &[u8; SHA512_SIZE],
    ) -> SMBSecurityResult<Self> {
        let mut secmech = SecMech::new();
        let derived = compute_signing_key(
            &mut secmech,
            session_key.as_bytes(),
            dialect,
            preauth_hash,
            CMAC_AES_SIZE,
        )?;
        let mut signing_key = [0u8; CMAC_AES_SIZE];
        signing_key.copy_from_slice(&derived);
        Ok(Self {
            signing_key,
            secmech,
        })
    }

    pub fn signing_key(&self) -> &[u8; CMAC_AES_SIZE] {
        &self.signing_key
    }

    /// Signs an SMB3 PDU with this channel's key.
    pub fn sign(&mut self, pdu: &[u8]) -> SMBSecurityResult<[u8; CMAC_AES_SIZE]> {
        sign_smb3(&mut self.secmech, &self.signing_key, pdu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::crypto::SESSION_KEY_SIZE;

    #[test]
    fn bound_channel_signs_deterministically() {
        let key = SessionKey::new([0x11u8; SESSION_KEY_SIZE]);
        let mut channel = SMBChannel::bind(&key, SMBDialect::V3_0_0, &[0u8; 64]).unwrap();
        let pdu = b"\xfeSMB-signed-pdu";
        assert_eq!(channel.sign(pdu).unwrap(), channel.sign(pdu).unwrap());
    }

    #[test]
    fn pre_smb3_binding_reuses_session_key_head() {
        let key = SessionKey::new([0x22u8; SESSION_KEY_SIZE]);
        let channel = SMBChannel::bind(&key, SMBDialect::V2_0_2, &[0u8; 64]).unwrap();
        assert_eq!(channel.signing_key()[..], key.as_bytes()[..16]);
    }
}
