use crate::error::{SMBSecurityError, SMBSecurityResult};
use crate::protocol::dialect::SMBDialect;
use crate::server::session::SessionKey;
use crate::util::crypto::preauth::{calc_preauth_integrity_hash, PreauthIntegrityHashId};
use crate::util::crypto::secmech::SecMech;
use crate::util::crypto::signing::{calculate_signature, SigningContext};
use crate::util::crypto::{CRYPTO_KEY_SIZE, SHA512_SIZE};

/// Per-connection security state: the negotiated dialect, the cached
/// primitive contexts, the running preauth integrity hash and the challenge
/// issued during NTLMSSP negotiation.
pub struct SMBConnection {
    secmech: SecMech,
    dialect: SMBDialect,
    preauth_hash_id: PreauthIntegrityHashId,
    preauth_hash: [u8; SHA512_SIZE],
    server_challenge: [u8; CRYPTO_KEY_SIZE],
}

impl SMBConnection {
    pub fn new(dialect: SMBDialect) -> Self {
        Self {
            secmech: SecMech::new(),
            dialect,
            preauth_hash_id: PreauthIntegrityHashId::default(),
            preauth_hash: [0u8; SHA512_SIZE],
            server_challenge: [0u8; CRYPTO_KEY_SIZE],
        }
    }

    pub fn dialect(&self) -> SMBDialect {
        self.dialect
    }

    pub fn set_dialect(&mut self, dialect: SMBDialect) {
        self.dialect = dialect;
    }

    pub fn preauth_hash(&self) -> &[u8; SHA512_SIZE] {
        &self.preauth_hash
    }

    pub fn set_server_challenge(&mut self, challenge: [u8; CRYPTO_KEY_SIZE]) {
        self.server_challenge = challenge;
    }

    pub fn server_challenge(&self) -> [u8; CRYPTO_KEY_SIZE] {
        self.server_challenge
    }

    pub fn secmech_mut(&mut self) -> &mut SecMech {
        &mut self.secmech
    }

    /// Folds one framed negotiation-phase PDU into the running preauth hash.
    /// Callers drive this for every negotiate/session-setup exchange of an
    /// SMB 3.1.1 connection, in wire order.
    pub fn update_preauth_hash(&mut self, buf: &[u8]) -> SMBSecurityResult<()> {
        self.preauth_hash = calc_preauth_integrity_hash(
            &mut self.secmech,
            self.preauth_hash_id,
            buf,
            &self.preauth_hash,
        )?;
        Ok(())
    }

    /// Signs a PDU with the session key under the connection's dialect.
    /// SMB3 PDUs carry a channel-derived key and are signed on the bound
    /// channel, never here.
    pub fn sign(&mut self, session_key: &SessionKey, pdu: &[u8]) -> SMBSecurityResult<Vec<u8>> {
        let context = match self.dialect {
            SMBDialect::V1_0 => SigningContext::Smb1 {
                session_key: session_key.as_bytes(),
            },
            dialect if dialect.is_smb3() => {
                return Err(SMBSecurityError::crypto_unavailable("cmac(aes)"))
            }
            _ => SigningContext::Smb2 {
                session_key: session_key.as_bytes(),
            },
        };
        calculate_signature(&mut self.secmech, context, pdu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::crypto::SESSION_KEY_SIZE;

    fn framed(message: &[u8]) -> Vec<u8> {
        let mut buf = (message.len() as u32).to_be_bytes().to_vec();
        buf.extend_from_slice(message);
        buf
    }

    #[test]
    fn preauth_hash_accumulates_in_order() {
        let mut connection = SMBConnection::new(SMBDialect::V3_1_1);
        assert_eq!(connection.preauth_hash(), &[0u8; 64]);
        connection
            .update_preauth_hash(&framed(b"negotiate-request"))
            .unwrap();
        let after_first = *connection.preauth_hash();
        connection
            .update_preauth_hash(&framed(b"negotiate-response"))
            .unwrap();
        assert_ne!(connection.preauth_hash(), &after_first);
    }

    #[test]
    fn dialect_selects_signature_shape() {
        let key = SessionKey::new([0x33u8; SESSION_KEY_SIZE]);
        let mut smb1 = SMBConnection::new(SMBDialect::V1_0);
        let mut smb2 = SMBConnection::new(SMBDialect::V2_1_0);
        assert_eq!(smb1.sign(&key, b"pdu").unwrap().len(), 16);
        assert_eq!(smb2.sign(&key, b"pdu").unwrap().len(), 32);

        // SMB3 signing needs a channel key and is refused here
        let mut smb3 = SMBConnection::new(SMBDialect::V3_1_1);
        assert!(smb3.sign(&key, b"pdu").is_err());
    }
}
