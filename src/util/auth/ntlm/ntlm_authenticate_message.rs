use nom::number::complete::le_u32;

use crate::byte_helper::{string_from_utf16_le, u32_to_bytes, utf16_le_bytes};
use crate::error::{SMBSecurityError, SMBSecurityResult};
use crate::util::auth::ntlm::ntlm_message::{validate_blob_header, SecurityBuffer};
use crate::util::auth::ntlm::NTLMNegotiateFlags;
use crate::util::crypto::AUTH_RESP_SIZE;

/// Fixed portion of the Authenticate message: signature, type, six security
/// buffers and the flag word.
const AUTHENTICATE_MESSAGE_SIZE: usize = 64;

/// NTLMSSP type-3 message: the client's challenge responses plus its claimed
/// identity.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct NTLMAuthenticateMessageBody {
    pub negotiate_flags: NTLMNegotiateFlags,
    pub lm_response: Vec<u8>,
    pub nt_response: Vec<u8>,
    pub domain_name: String,
    pub user_name: String,
    pub workstation: String,
    pub encrypted_session_key: Vec<u8>,
}

impl NTLMAuthenticateMessageBody {
    pub fn decode(bytes: &[u8]) -> SMBSecurityResult<Self> {
        validate_blob_header(bytes, AUTHENTICATE_MESSAGE_SIZE)?;

        let mut fixed = &bytes[12..AUTHENTICATE_MESSAGE_SIZE];
        let mut buffers = [SecurityBuffer {
            length: 0,
            max_length: 0,
            offset: 0,
        }; 6];
        for buffer in buffers.iter_mut() {
            let (rest, parsed) = SecurityBuffer::parse(fixed).map_err(SMBSecurityError::from)?;
            *buffer = parsed;
            fixed = rest;
        }
        let (_, raw_flags) =
            le_u32::<_, nom::error::Error<&[u8]>>(fixed).map_err(SMBSecurityError::from)?;
        let [lm, nt, domain, user, workstation, session_key] = buffers;

        Ok(Self {
            negotiate_flags: NTLMNegotiateFlags::from_bits_truncate(raw_flags),
            lm_response: lm.slice(bytes)?.to_vec(),
            nt_response: nt.slice(bytes)?.to_vec(),
            domain_name: string_from_utf16_le(domain.slice(bytes)?)?,
            user_name: string_from_utf16_le(user.slice(bytes)?)?,
            workstation: string_from_utf16_le(workstation.slice(bytes)?)?,
            encrypted_session_key: session_key.slice(bytes)?.to_vec(),
        })
    }

    /// A 24-byte NT response selects the NTLMv1 computation; anything longer
    /// is an NTLMv2 proof-plus-blob.
    pub fn is_ntlmv1(&self) -> bool {
        self.nt_response.len() == AUTH_RESP_SIZE
    }

    /// Anonymous logons carry the flag or simply omit both identity and
    /// response.
    pub fn is_anonymous(&self) -> bool {
        self.negotiate_flags.contains(NTLMNegotiateFlags::ANONYMOUS)
            || (self.user_name.is_empty() && self.nt_response.is_empty())
    }

    pub fn as_bytes(&self) -> Vec<u8> {
        let domain_bytes = utf16_le_bytes(&self.domain_name);
        let user_bytes = utf16_le_bytes(&self.user_name);
        let workstation_bytes = utf16_le_bytes(&self.workstation);
        let payloads: [&[u8]; 6] = [
            &self.lm_response,
            &self.nt_response,
            &domain_bytes,
            &user_bytes,
            &workstation_bytes,
            &self.encrypted_session_key,
        ];

        let total_payload: usize = payloads.iter().map(|payload| payload.len()).sum();
        let mut bytes = Vec::with_capacity(AUTHENTICATE_MESSAGE_SIZE + total_payload);
        bytes.extend_from_slice(b"NTLMSSP\0");
        bytes.extend_from_slice(&u32_to_bytes(0x03));

        let mut offset = AUTHENTICATE_MESSAGE_SIZE as u32;
        for payload in payloads {
            let buffer = SecurityBuffer {
                length: payload.len() as u16,
                max_length: payload.len() as u16,
                offset,
            };
            bytes.extend_from_slice(&buffer.to_bytes());
            offset += payload.len() as u32;
        }
        bytes.extend_from_slice(&u32_to_bytes(self.negotiate_flags.bits()));
        for payload in payloads {
            bytes.extend_from_slice(payload);
        }
        bytes
    }
}
