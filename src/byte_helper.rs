use crate::error::{SMBSecurityError, SMBSecurityResult};

pub(crate) fn u16_to_bytes(num: u16) -> [u8; 2] {
    num.to_le_bytes()
}

pub(crate) fn u32_to_bytes(num: u32) -> [u8; 4] {
    num.to_le_bytes()
}

/// UTF-16LE encoding as it appears inside NTLMSSP buffers.
pub(crate) fn utf16_le_bytes(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(u16::to_le_bytes).collect()
}

pub(crate) fn string_from_utf16_le(bytes: &[u8]) -> SMBSecurityResult<String> {
    if bytes.len() % 2 != 0 {
        return Err(SMBSecurityError::malformed_blob(
            "odd-length unicode buffer",
        ));
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units)
        .map_err(|_| SMBSecurityError::malformed_blob("invalid unicode buffer"))
}
