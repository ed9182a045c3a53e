use bitflags::bitflags;
use nom::bytes::complete::take;
use nom::number::complete::{le_u16, le_u32};
use nom::sequence::tuple;
use nom::IResult;
use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};

use crate::byte_helper::{u16_to_bytes, u32_to_bytes};
use crate::error::{SMBSecurityError, SMBSecurityResult};
use crate::util::auth::ntlm::{
    NTLMAuthenticateMessageBody, NTLMChallengeMessageBody, NTLMNegotiateMessageBody,
};

/// 8-byte signature opening every NTLMSSP message.
pub const NTLMSSP_SIGNATURE: &[u8; 8] = b"NTLMSSP\0";

pub(crate) const NTLMSSP_NEGOTIATE_TYPE: u32 = 0x01;
pub(crate) const NTLMSSP_CHALLENGE_TYPE: u32 = 0x02;
pub(crate) const NTLMSSP_AUTHENTICATE_TYPE: u32 = 0x03;

bitflags! {
    #[derive(Serialize, Deserialize)]
    pub struct NTLMNegotiateFlags: u32 {
        const UNICODE_ENCODING = 0x01;
        const OEM_ENCODING = 0x02;
        const REQUEST_TARGET = 0x04;
        const SIGN = 0x10;
        const SEAL = 0x20;
        const DATAGRAM = 0x40;
        const LAN_MANAGER_SESSION_KEY = 0x80;
        const NTLM_SESSION_SECURITY = 0x200;
        const ANONYMOUS = 0x800;
        const DOMAIN_NAME_SUPPLIED = 0x1000;
        const WORKSTATION_NAME_SUPPLIED = 0x2000;
        const ALWAYS_SIGN = 0x8000;
        const TARGET_TYPE_DOMAIN = 0x10000;
        const TARGET_TYPE_SERVER = 0x20000;
        const EXTENDED_SESSION_SECURITY = 0x80000;
        const IDENTIFY = 0x100000;
        const REQUEST_NON_NT_SESSION_KEY = 0x400000;
        const TARGET_INFO = 0x800000;
        const VERSION = 0x2000000;
        const USE_128_BIT_ENCRYPTION = 0x20000000;
        const KEY_EXCHANGE = 0x40000000;
        const USE_56_BIT_ENCRYPTION = 0x80000000;
    }
}

/// A decoded NTLMSSP handshake message.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum NTLMMessage {
    Negotiate(NTLMNegotiateMessageBody),
    Challenge(NTLMChallengeMessageBody),
    Authenticate(NTLMAuthenticateMessageBody),
}

impl NTLMMessage {
    /// Decodes any of the three message types, dispatching on the LE
    /// message-type discriminant behind the signature.
    pub fn decode(bytes: &[u8]) -> SMBSecurityResult<Self> {
        if bytes.len() < 12 {
            return Err(SMBSecurityError::malformed_blob(format!(
                "blob len {} too small",
                bytes.len()
            )));
        }
        let msg_type = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
        match msg_type {
            NTLMSSP_NEGOTIATE_TYPE => NTLMNegotiateMessageBody::decode(bytes).map(Self::Negotiate),
            NTLMSSP_CHALLENGE_TYPE => NTLMChallengeMessageBody::decode(bytes).map(Self::Challenge),
            NTLMSSP_AUTHENTICATE_TYPE => {
                NTLMAuthenticateMessageBody::decode(bytes).map(Self::Authenticate)
            }
            other => Err(SMBSecurityError::malformed_blob(format!(
                "unknown ntlmssp message type {}",
                other
            ))),
        }
    }
}

/// Checks the fixed-size head of a blob: minimum length and the literal
/// NTLMSSP signature. Every decode path runs this before touching any
/// security buffer.
pub(crate) fn validate_blob_header(bytes: &[u8], min_size: usize) -> SMBSecurityResult<()> {
    if bytes.len() < min_size {
        return Err(SMBSecurityError::malformed_blob(format!(
            "blob len {} too small",
            bytes.len()
        )));
    }
    if &bytes[..8] != NTLMSSP_SIGNATURE {
        return Err(SMBSecurityError::malformed_blob("blob signature incorrect"));
    }
    Ok(())
}

/// A "security buffer" descriptor: length, maximum length and offset into
/// the same message.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct SecurityBuffer {
    pub length: u16,
    pub max_length: u16,
    pub offset: u32,
}

impl SecurityBuffer {
    pub(crate) fn parse(bytes: &[u8]) -> IResult<&[u8], Self> {
        let (remaining, (length, max_length, offset)) =
            tuple((le_u16, le_u16, le_u32))(bytes)?;
        Ok((
            remaining,
            Self {
                length,
                max_length,
                offset,
            },
        ))
    }

    /// Dereferences the buffer inside `message`, rejecting any reference
    /// that does not lie fully within the message bounds.
    pub(crate) fn slice<'a>(&self, message: &'a [u8]) -> SMBSecurityResult<&'a [u8]> {
        let start = self.offset as usize;
        let end = start
            .checked_add(self.length as usize)
            .ok_or_else(|| SMBSecurityError::malformed_blob("security buffer overflow"))?;
        message
            .get(start..end)
            .ok_or_else(|| SMBSecurityError::malformed_blob("security buffer out of bounds"))
    }

    pub(crate) fn to_bytes(self) -> [u8; 8] {
        let mut bytes = [0u8; 8];
        bytes[..2].copy_from_slice(&u16_to_bytes(self.length));
        bytes[2..4].copy_from_slice(&u16_to_bytes(self.max_length));
        bytes[4..].copy_from_slice(&u32_to_bytes(self.offset));
        bytes
    }
}

/// Target-info attribute types advertised in the Challenge message.
#[repr(u16)]
#[derive(Debug, Eq, PartialEq, TryFromPrimitive, Serialize, Deserialize, Copy, Clone)]
pub enum AvId {
    EndOfList = 0x0000,
    NbComputerName = 0x0001,
    NbDomainName = 0x0002,
    DnsComputerName = 0x0003,
    DnsDomainName = 0x0004,
}

/// One (type, length, content) triple of the target-info attribute list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvPair {
    pub av_id: u16,
    pub value: Vec<u8>,
}

impl AvPair {
    pub fn new(av_id: AvId, value: Vec<u8>) -> Self {
        Self {
            av_id: av_id as u16,
            value,
        }
    }
}

/// Encodes an attribute list, appending the zero/zero terminator.
pub fn encode_av_pairs(pairs: &[AvPair]) -> Vec<u8> {
    let mut bytes = Vec::new();
    for pair in pairs {
        bytes.extend_from_slice(&u16_to_bytes(pair.av_id));
        bytes.extend_from_slice(&u16_to_bytes(pair.value.len() as u16));
        bytes.extend_from_slice(&pair.value);
    }
    bytes.extend_from_slice(&u16_to_bytes(AvId::EndOfList as u16));
    bytes.extend_from_slice(&u16_to_bytes(0));
    bytes
}

/// Parses an attribute list up to and including its terminator; the
/// terminator itself is not returned.
pub fn parse_av_pairs(bytes: &[u8]) -> SMBSecurityResult<Vec<AvPair>> {
    let mut pairs = Vec::new();
    let mut remaining = bytes;
    loop {
        let (rest, (av_id, length)) =
            tuple::<_, _, nom::error::Error<&[u8]>, _>((le_u16, le_u16))(remaining)
                .map_err(SMBSecurityError::from)?;
        if av_id == AvId::EndOfList as u16 && length == 0 {
            return Ok(pairs);
        }
        let (rest, value) = take::<_, _, nom::error::Error<&[u8]>>(length as usize)(rest)
            .map_err(SMBSecurityError::from)?;
        pairs.push(AvPair {
            av_id,
            value: value.to_vec(),
        });
        remaining = rest;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn security_buffer_round_trip() {
        let buffer = SecurityBuffer {
            length: 8,
            max_length: 8,
            offset: 48,
        };
        let bytes = buffer.to_bytes();
        let (_, parsed) = SecurityBuffer::parse(&bytes).unwrap();
        assert_eq!(parsed, buffer);
    }

    #[test]
    fn security_buffer_out_of_bounds_rejected() {
        let buffer = SecurityBuffer {
            length: 16,
            max_length: 16,
            offset: 20,
        };
        let message = [0u8; 32];
        assert!(matches!(
            buffer.slice(&message).unwrap_err(),
            SMBSecurityError::MalformedBlob(_)
        ));
    }

    #[test]
    fn av_pair_round_trip() {
        let pairs = vec![
            AvPair::new(AvId::NbComputerName, b"F\0S\0R\0V\0".to_vec()),
            AvPair::new(AvId::DnsDomainName, b"F\0S\0R\0V\0".to_vec()),
        ];
        let encoded = encode_av_pairs(&pairs);
        assert_eq!(encoded.len(), 2 * (4 + 8) + 4);
        assert_eq!(parse_av_pairs(&encoded).unwrap(), pairs);
    }

    #[test]
    fn av_pairs_without_terminator_rejected() {
        let pairs = vec![AvPair::new(AvId::NbComputerName, b"X\0".to_vec())];
        let mut encoded = encode_av_pairs(&pairs);
        encoded.truncate(encoded.len() - 4);
        assert!(parse_av_pairs(&encoded).is_err());
    }
}
