use nom::bytes::complete::take;
use nom::number::complete::le_u32;
use rand::{thread_rng, Rng};

use crate::byte_helper::{string_from_utf16_le, u32_to_bytes, utf16_le_bytes};
use crate::error::{SMBSecurityError, SMBSecurityResult};
use crate::util::auth::ntlm::ntlm_message::{validate_blob_header, SecurityBuffer};
use crate::util::auth::ntlm::{
    ntlm_message::{encode_av_pairs, parse_av_pairs},
    AvId, AvPair, NTLMNegotiateFlags,
};
use crate::util::crypto::CRYPTO_KEY_SIZE;

/// Fixed portion of the Challenge message: signature, type, target-name
/// buffer, flags, challenge, reserved and target-info buffer.
const CHALLENGE_MESSAGE_SIZE: usize = 48;

/// NTLMSSP type-2 message carrying the server challenge and the target-info
/// attribute list the client folds into its NTLMv2 blob.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct NTLMChallengeMessageBody {
    pub negotiate_flags: NTLMNegotiateFlags,
    pub server_challenge: [u8; CRYPTO_KEY_SIZE],
    pub target_name: String,
    pub target_info: Vec<AvPair>,
}

impl NTLMChallengeMessageBody {
    /// Builds the server's challenge for `target_name` (the NetBIOS name),
    /// drawing a fresh 8-byte challenge. `REQUEST_TARGET` is echoed from the
    /// client's proposal; the remaining flags are fixed server policy.
    pub fn new(target_name: &str, client_flags: NTLMNegotiateFlags) -> Self {
        let mut negotiate_flags = NTLMNegotiateFlags::UNICODE_ENCODING
            | NTLMNegotiateFlags::NTLM_SESSION_SECURITY
            | NTLMNegotiateFlags::TARGET_TYPE_SERVER
            | NTLMNegotiateFlags::TARGET_INFO
            | NTLMNegotiateFlags::USE_128_BIT_ENCRYPTION
            | NTLMNegotiateFlags::USE_56_BIT_ENCRYPTION
            | NTLMNegotiateFlags::VERSION;
        if client_flags.contains(NTLMNegotiateFlags::REQUEST_TARGET) {
            negotiate_flags |= NTLMNegotiateFlags::REQUEST_TARGET;
        }

        let mut server_challenge = [0u8; CRYPTO_KEY_SIZE];
        thread_rng().fill(&mut server_challenge[..]);

        let name_utf16 = utf16_le_bytes(target_name);
        let target_info = vec![
            AvPair::new(AvId::NbComputerName, name_utf16.clone()),
            AvPair::new(AvId::NbDomainName, name_utf16.clone()),
            AvPair::new(AvId::DnsComputerName, name_utf16.clone()),
            AvPair::new(AvId::DnsDomainName, name_utf16),
        ];

        Self {
            negotiate_flags,
            server_challenge,
            target_name: target_name.into(),
            target_info,
        }
    }

    pub fn decode(bytes: &[u8]) -> SMBSecurityResult<Self> {
        validate_blob_header(bytes, CHALLENGE_MESSAGE_SIZE)?;

        let fixed = &bytes[12..CHALLENGE_MESSAGE_SIZE];
        let (fixed, target_name_buffer) =
            SecurityBuffer::parse(fixed).map_err(SMBSecurityError::from)?;
        let (fixed, raw_flags) =
            le_u32::<_, nom::error::Error<&[u8]>>(fixed).map_err(SMBSecurityError::from)?;
        let (fixed, challenge) = take::<_, _, nom::error::Error<&[u8]>>(CRYPTO_KEY_SIZE)(fixed)
            .map_err(SMBSecurityError::from)?;
        // 8 reserved bytes precede the target-info buffer
        let (fixed, _) = take::<_, _, nom::error::Error<&[u8]>>(8usize)(fixed)
            .map_err(SMBSecurityError::from)?;
        let (_, target_info_buffer) =
            SecurityBuffer::parse(fixed).map_err(SMBSecurityError::from)?;

        let mut server_challenge = [0u8; CRYPTO_KEY_SIZE];
        server_challenge.copy_from_slice(challenge);

        Ok(Self {
            negotiate_flags: NTLMNegotiateFlags::from_bits_truncate(raw_flags),
            server_challenge,
            target_name: string_from_utf16_le(target_name_buffer.slice(bytes)?)?,
            target_info: parse_av_pairs(target_info_buffer.slice(bytes)?)?,
        })
    }

    pub fn as_bytes(&self) -> Vec<u8> {
        let name_bytes = utf16_le_bytes(&self.target_name);
        let info_bytes = encode_av_pairs(&self.target_info);

        let target_name_buffer = SecurityBuffer {
            length: name_bytes.len() as u16,
            max_length: name_bytes.len() as u16,
            offset: CHALLENGE_MESSAGE_SIZE as u32,
        };
        let target_info_buffer = SecurityBuffer {
            length: info_bytes.len() as u16,
            max_length: info_bytes.len() as u16,
            offset: (CHALLENGE_MESSAGE_SIZE + name_bytes.len()) as u32,
        };

        let mut bytes =
            Vec::with_capacity(CHALLENGE_MESSAGE_SIZE + name_bytes.len() + info_bytes.len());
        bytes.extend_from_slice(b"NTLMSSP\0");
        bytes.extend_from_slice(&u32_to_bytes(0x02));
        bytes.extend_from_slice(&target_name_buffer.to_bytes());
        bytes.extend_from_slice(&u32_to_bytes(self.negotiate_flags.bits()));
        bytes.extend_from_slice(&self.server_challenge);
        bytes.extend_from_slice(&[0u8; 8]);
        bytes.extend_from_slice(&target_info_buffer.to_bytes());
        bytes.extend_from_slice(&name_bytes);
        bytes.extend_from_slice(&info_bytes);
        bytes
    }
}
