use digest::Digest;
use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::{SMBSecurityError, SMBSecurityResult};
use crate::util::crypto::secmech::SecMech;
use crate::util::crypto::SHA512_SIZE;

/// Preauth-integrity hash algorithm negotiated for SMB 3.1.1. Only SHA-512
/// is defined.
#[repr(u16)]
#[derive(Debug, Eq, PartialEq, TryFromPrimitive, Serialize, Deserialize, Copy, Clone, Default)]
pub enum PreauthIntegrityHashId {
    #[default]
    Sha512 = 0x0001,
}

/// Folds one negotiation-phase message into the running preauth hash:
/// SHA-512 over the previous 64-byte value followed by the raw message.
///
/// `buf` is the framed PDU: a 4-byte big-endian declared-length field, then
/// the message starting at its protocol identifier. Exactly the declared
/// bytes participate; trailing bytes beyond the declared length do not.
/// Messages must be fed in wire order or the derived 3.1.1 keys are
/// silently wrong.
pub fn calc_preauth_integrity_hash(
    secmech: &mut SecMech,
    hash_id: PreauthIntegrityHashId,
    buf: &[u8],
    previous: &[u8; SHA512_SIZE],
) -> SMBSecurityResult<[u8; SHA512_SIZE]> {
    let PreauthIntegrityHashId::Sha512 = hash_id;

    if buf.len() < 4 {
        return Err(SMBSecurityError::malformed_blob(
            "pdu shorter than its length field",
        ));
    }
    let declared = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;
    let message = buf
        .get(4..4 + declared)
        .ok_or_else(|| SMBSecurityError::malformed_blob("declared pdu length out of bounds"))?;

    secmech.alloc_sha512()?;
    let digest = secmech
        .sha512()?
        .chain_update(previous)
        .chain_update(message)
        .finalize();

    let mut hash = [0u8; SHA512_SIZE];
    hash.copy_from_slice(&digest);
    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn framed(message: &[u8]) -> Vec<u8> {
        let mut buf = (message.len() as u32).to_be_bytes().to_vec();
        buf.extend_from_slice(message);
        buf
    }

    #[test]
    fn hash_chains_over_previous_value() {
        let mut secmech = SecMech::new();
        let first = calc_preauth_integrity_hash(
            &mut secmech,
            PreauthIntegrityHashId::Sha512,
            &framed(b"negotiate-request"),
            &[0u8; 64],
        )
        .unwrap();
        let second = calc_preauth_integrity_hash(
            &mut secmech,
            PreauthIntegrityHashId::Sha512,
            &framed(b"negotiate-response"),
            &first,
        )
        .unwrap();
        assert_ne!(first, second);

        // replaying the same messages in the same order reproduces the value
        let replay_first = calc_preauth_integrity_hash(
            &mut secmech,
            PreauthIntegrityHashId::Sha512,
            &framed(b"negotiate-request"),
            &[0u8; 64],
        )
        .unwrap();
        assert_eq!(first, replay_first);
    }

    #[test]
    fn order_matters() {
        let mut secmech = SecMech::new();
        let forward = calc_preauth_integrity_hash(
            &mut secmech,
            PreauthIntegrityHashId::Sha512,
            &framed(b"a"),
            &[0u8; 64],
        )
        .and_then(|h| {
            calc_preauth_integrity_hash(
                &mut secmech,
                PreauthIntegrityHashId::Sha512,
                &framed(b"b"),
                &h,
            )
        })
        .unwrap();
        let backward = calc_preauth_integrity_hash(
            &mut secmech,
            PreauthIntegrityHashId::Sha512,
            &framed(b"b"),
            &[0u8; 64],
        )
        .and_then(|h| {
            calc_preauth_integrity_hash(
                &mut secmech,
                PreauthIntegrityHashId::Sha512,
                &framed(b"a"),
                &h,
            )
        })
        .unwrap();
        assert_ne!(forward, backward);
    }

    #[test]
    fn declared_length_bounds_the_input() {
        let mut secmech = SecMech::new();
        let mut buf = framed(b"message");
        let clean = calc_preauth_integrity_hash(
            &mut secmech,
            PreauthIntegrityHashId::Sha512,
            &buf,
            &[0u8; 64],
        )
        .unwrap();
        // trailing bytes beyond the declared length are not hashed
        buf.extend_from_slice(b"trailing");
        let padded = calc_preauth_integrity_hash(
            &mut secmech,
            PreauthIntegrityHashId::Sha512,
            &buf,
            &[0u8; 64],
        )
        .unwrap();
        assert_eq!(clean, padded);
    }

    #[test]
    fn oversized_declared_length_rejected() {
        let mut secmech = SecMech::new();
        let mut buf = framed(b"short");
        buf[3] = 0xFF;
        let err = calc_preauth_integrity_hash(
            &mut secmech,
            PreauthIntegrityHashId::Sha512,
            &buf,
            &[0u8; 64],
        )
        .unwrap_err();
        assert!(matches!(err, SMBSecurityError::MalformedBlob(_)));
    }
}
