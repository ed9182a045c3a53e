use des::cipher::generic_array::GenericArray;
use des::cipher::{BlockEncrypt, KeyInit};
use des::Des;

use crate::error::{SMBSecurityError, SMBSecurityResult};
use crate::util::crypto::{AUTH_RESP_SIZE, CRYPTO_KEY_SIZE, NT_HASH_SIZE};

/// The classic "E_P24" operation: pads the 16-byte NT hash to 21 bytes,
/// splits it into three 7-byte DES keys and encrypts the 8-byte challenge
/// under each, yielding the 24-byte NTLMv1 response.
pub fn des_long_encrypt(
    key: &[u8; NT_HASH_SIZE],
    block: &[u8; CRYPTO_KEY_SIZE],
) -> SMBSecurityResult<[u8; AUTH_RESP_SIZE]> {
    let mut padded = [0u8; 21];
    padded[..NT_HASH_SIZE].copy_from_slice(key);

    let mut response = [0u8; AUTH_RESP_SIZE];
    for (part, out) in padded.chunks_exact(7).zip(response.chunks_exact_mut(8)) {
        let expanded = expand_des_key(part);
        let cipher = Des::new_from_slice(&expanded)
            .map_err(|_| SMBSecurityError::crypto_failed("des rejected key"))?;
        let mut encrypted = [0u8; 8];
        cipher.encrypt_block_b2b(
            GenericArray::from_slice(block),
            GenericArray::from_mut_slice(&mut encrypted),
        );
        out.copy_from_slice(&encrypted);
    }

    Ok(response)
}

/// Spreads a 7-byte key over 8 bytes, one data bit short per byte; the low
/// bit is left for DES parity.
fn expand_des_key(key: &[u8]) -> [u8; 8] {
    let mut result = [0u8; 8];

    result[0] = key[0] >> 1;
    result[1] = ((key[0] & 0x01) << 6) | (key[1] >> 2);
    result[2] = ((key[1] & 0x03) << 5) | (key[2] >> 3);
    result[3] = ((key[2] & 0x07) << 4) | (key[3] >> 4);
    result[4] = ((key[3] & 0x0F) << 3) | (key[4] >> 5);
    result[5] = ((key[4] & 0x1F) << 2) | (key[5] >> 6);
    result[6] = ((key[5] & 0x3F) << 1) | (key[6] >> 7);
    result[7] = key[6] & 0x7F;

    for byte in result.iter_mut() {
        *byte <<= 1;
    }

    result
}
