use tracing::debug;

use crate::error::{SMBSecurityError, SMBSecurityResult};
use crate::server::{SMBConnection, SMBSession, SessionKey};
use crate::util::auth::ntlm::{
    NTLMAuthenticateMessageBody, NTLMChallengeMessageBody, NTLMNegotiateMessageBody,
};
use crate::util::auth::{CredentialStore, User};
use crate::util::crypto::ntlm::{verify_ntlmv1, verify_ntlmv2};
use crate::util::crypto::{NTLMV2_HASH_SIZE, SESSION_KEY_SIZE};

/// Server-side NTLMSSP handshake driver.
///
/// Owns the account store and server identity; all per-connection and
/// per-session state lives on the `SMBConnection`/`SMBSession` passed in, so
/// one provider serves every connection.
pub struct NTLMAuthProvider {
    accepted_users: Vec<User>,
    netbios_name: String,
    guest_supported: bool,
}

impl NTLMAuthProvider {
    pub fn new(accepted_users: Vec<User>, netbios_name: String, guest_supported: bool) -> Self {
        Self {
            accepted_users,
            netbios_name,
            guest_supported,
        }
    }

    /// Negotiate leg: record the client's flag proposal on the session.
    pub fn negotiate(&self, session: &mut SMBSession, message: &NTLMNegotiateMessageBody) {
        session.set_client_flags(message.negotiate_flags);
    }

    /// Challenge leg: draw a fresh server challenge, remember it on the
    /// connection and return the encoded Challenge message.
    pub fn build_challenge(
        &self,
        connection: &mut SMBConnection,
        session: &SMBSession,
    ) -> Vec<u8> {
        let challenge = NTLMChallengeMessageBody::new(&self.netbios_name, session.client_flags());
        connection.set_server_challenge(challenge.server_challenge);
        challenge.as_bytes()
    }

    /// Authenticate leg: verify the client's response against the account
    /// store and, on success, commit the session key and identity.
    ///
    /// An unknown account and a wrong response both surface as `AuthFailed`;
    /// nothing about the session changes on any failure.
    pub fn authenticate(
        &self,
        connection: &mut SMBConnection,
        session: &mut SMBSession,
        message: &NTLMAuthenticateMessageBody,
    ) -> SMBSecurityResult<SessionKey> {
        if message.is_anonymous() {
            if !self.guest_supported {
                debug!("anonymous logon refused");
                return Err(SMBSecurityError::AuthFailed);
            }
            debug!("anonymous logon accepted as guest");
            let session_key = SessionKey::new([0u8; SESSION_KEY_SIZE]);
            session.establish_guest(message.user_name.clone(), session_key.clone());
            return Ok(session_key);
        }

        let user = self
            .accepted_users
            .lookup_user(&message.user_name)
            .ok_or_else(|| {
                debug!(user = %message.user_name, "account not present");
                SMBSecurityError::AuthFailed
            })?;

        let server_challenge = connection.server_challenge();
        let key_bytes = if message.is_ntlmv1() {
            verify_ntlmv1(&user.nt_hash, &server_challenge, &message.nt_response)?
        } else {
            let blob_len = message
                .nt_response
                .len()
                .checked_sub(NTLMV2_HASH_SIZE)
                .ok_or_else(|| {
                    SMBSecurityError::malformed_blob("nt response shorter than its proof")
                })?;
            // clients that claim no domain authenticated against our name
            let target = if message.domain_name.is_empty() {
                self.netbios_name.as_str()
            } else {
                message.domain_name.as_str()
            };
            verify_ntlmv2(
                connection.secmech_mut(),
                &user.nt_hash,
                &message.user_name,
                target,
                &server_challenge,
                &message.nt_response,
                blob_len,
            )?
        };

        let session_key = SessionKey::new(key_bytes);
        session.establish(message.user_name.clone(), session_key.clone());
        if message.is_ntlmv1() {
            session.set_sequence_number(1);
        }
        Ok(session_key)
    }
}
