use crate::error::{SMBSecurityError, SMBSecurityResult};
use crate::protocol::dialect::SMBDialect;
use crate::server::channel::SMBChannel;
use crate::util::auth::ntlm::NTLMNegotiateFlags;
use crate::util::crypto::{SESSION_KEY_SIZE, SHA512_SIZE, SMB2_SESSKEY_SIZE};

/// The 40-byte session-key field committed on successful authentication.
///
/// The first 16 bytes are the dialect-independent key material the SMB2/SMB3
/// paths consume; NTLMv1 additionally fills the 24-byte tail with the client
/// response for SMB1 signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionKey([u8; SESSION_KEY_SIZE]);

impl SessionKey {
    pub fn new(bytes: [u8; SESSION_KEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SESSION_KEY_SIZE] {
        &self.0
    }

    /// The 16-byte head consumed by SMB2 signing and SMB3 key derivation.
    pub fn smb2_key(&self) -> &[u8] {
        &self.0[..SMB2_SESSKEY_SIZE]
    }
}

/// Authentication state of one SMB session, from the client's Negotiate leg
/// through establishment and channel binding.
///
/// No key material lives here until verification succeeds; a failed
/// authentication leaves the session exactly as it was.
pub struct SMBSession {
    client_flags: NTLMNegotiateFlags,
    user_name: Option<String>,
    session_key: Option<SessionKey>,
    sequence_number: u64,
    guest: bool,
    channels: Vec<SMBChannel>,
}

impl Default for SMBSession {
    fn default() -> Self {
        Self {
            client_flags: NTLMNegotiateFlags::empty(),
            user_name: None,
            session_key: None,
            sequence_number: 0,
            guest: false,
            channels: Vec::new(),
        }
    }
}

impl SMBSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_client_flags(&mut self, flags: NTLMNegotiateFlags) {
        self.client_flags = flags;
    }

    pub fn client_flags(&self) -> NTLMNegotiateFlags {
        self.client_flags
    }

    /// Commits the authenticated identity and key material.
    pub fn establish(&mut self, user_name: String, session_key: SessionKey) {
        self.user_name = Some(user_name);
        self.session_key = Some(session_key);
        self.guest = false;
    }

    /// Commits a guest logon: the identity is kept for accounting but the
    /// session key is all zeroes and the session never signs.
    pub fn establish_guest(&mut self, user_name: String, session_key: SessionKey) {
        self.user_name = Some(user_name);
        self.session_key = Some(session_key);
        self.guest = true;
    }

    pub fn is_established(&self) -> bool {
        self.session_key.is_some()
    }

    pub fn is_guest(&self) -> bool {
        self.guest
    }

    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }

    pub fn session_key(&self) -> Option<&SessionKey> {
        self.session_key.as_ref()
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn set_sequence_number(&mut self, sequence_number: u64) {
        self.sequence_number = sequence_number;
    }

    /// Binds a new channel to this session, deriving its signing key from
    /// the session key and (for SMB 3.1.1) the supplied preauth hash.
    pub fn bind_channel(
        &mut self,
        dialect: SMBDialect,
        preauth_hash: &[u8; SHA512_SIZE],
    ) -> SMBSecurityResult<&SMBChannel> {
        let session_key = self
            .session_key
            .as_ref()
            .ok_or(SMBSecurityError::AuthFailed)?;
        let channel = SMBChannel::bind(session_key, dialect, preauth_hash)?;
        self.channels.push(channel);
        self.channels
            .last()
            .ok_or_else(|| SMBSecurityError::allocation_failed("channel list empty after bind"))
    }

    pub fn channels(&self) -> &[SMBChannel] {
        &self.channels
    }

    pub fn channels_mut(&mut self) -> &mut [SMBChannel] {
        &mut self.channels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_requires_an_established_session() {
        let mut session = SMBSession::new();
        assert_eq!(
            session
                .bind_channel(SMBDialect::V3_1_1, &[0u8; 64])
                .unwrap_err(),
            SMBSecurityError::AuthFailed
        );
    }

    #[test]
    fn channels_derive_independent_keys_per_preauth_hash() {
        let mut session = SMBSession::new();
        session.establish("User".into(), SessionKey::new([0x5au8; SESSION_KEY_SIZE]));

        let first = *session
            .bind_channel(SMBDialect::V3_1_1, &[0u8; 64])
            .unwrap()
            .signing_key();
        let second = *session
            .bind_channel(SMBDialect::V3_1_1, &[1u8; 64])
            .unwrap()
            .signing_key();
        assert_ne!(first, second);
        assert_eq!(session.channels().len(), 2);
    }
}
