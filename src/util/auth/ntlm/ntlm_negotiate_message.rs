use nom::number::complete::le_u32;

use crate::error::SMBSecurityResult;
use crate::util::auth::ntlm::ntlm_message::validate_blob_header;
use crate::util::auth::ntlm::NTLMNegotiateFlags;

/// Fixed portion of the Negotiate message: signature, type, flags and the
/// domain/workstation security buffers.
const NEGOTIATE_MESSAGE_SIZE: usize = 32;

/// NTLMSSP type-1 message. Only the client's flag proposal is consumed; the
/// optional domain/workstation fields are advisory and ignored.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct NTLMNegotiateMessageBody {
    pub negotiate_flags: NTLMNegotiateFlags,
}

impl NTLMNegotiateMessageBody {
    pub fn new(negotiate_flags: NTLMNegotiateFlags) -> Self {
        Self { negotiate_flags }
    }

    pub fn decode(bytes: &[u8]) -> SMBSecurityResult<Self> {
        validate_blob_header(bytes, NEGOTIATE_MESSAGE_SIZE)?;
        let (_, raw_flags) = le_u32::<_, nom::error::Error<&[u8]>>(&bytes[12..16])?;
        Ok(Self {
            negotiate_flags: NTLMNegotiateFlags::from_bits_truncate(raw_flags),
        })
    }
}
