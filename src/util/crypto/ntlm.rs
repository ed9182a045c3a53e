use digest::Digest;
use hmac::Mac;
use md4::Md4;
use tracing::debug;

use crate::byte_helper::utf16_le_bytes;
use crate::error::{SMBSecurityError, SMBSecurityResult};
use crate::util::crypto::des::des_long_encrypt;
use crate::util::crypto::secmech::SecMech;
use crate::util::crypto::{
    AUTH_RESP_SIZE, CRYPTO_KEY_SIZE, NTLMV2_HASH_SIZE, NT_HASH_SIZE, SESSION_KEY_SIZE,
    SMB1_SESSKEY_SIZE, SMB2_SESSKEY_SIZE,
};

/// NTLMv1 challenge-response verification.
///
/// The expected response is the DES-long encryption of the server challenge
/// under the zero-padded NT hash. On a match the legacy session key is
/// returned: MD4 of the NT hash followed by the 24-byte response. Nothing is
/// produced on a mismatch.
pub fn verify_ntlmv1(
    nt_hash: &[u8; NT_HASH_SIZE],
    server_challenge: &[u8; CRYPTO_KEY_SIZE],
    client_response: &[u8],
) -> SMBSecurityResult<[u8; SESSION_KEY_SIZE]> {
    if client_response.len() != AUTH_RESP_SIZE {
        return Err(SMBSecurityError::malformed_blob(format!(
            "ntlmv1 response length {} != {}",
            client_response.len(),
            AUTH_RESP_SIZE
        )));
    }

    let expected = des_long_encrypt(nt_hash, server_challenge)?;
    // not a constant-time comparison; see DESIGN.md
    if expected[..] != *client_response {
        debug!("ntlmv1 authentication failed");
        return Err(SMBSecurityError::AuthFailed);
    }
    debug!("ntlmv1 authentication pass");

    let mut session_key = [0u8; SESSION_KEY_SIZE];
    session_key[..SMB1_SESSKEY_SIZE].copy_from_slice(&Md4::digest(nt_hash));
    session_key[SMB1_SESSKEY_SIZE..].copy_from_slice(&expected);
    Ok(session_key)
}

/// NTLMv2 hash: HMAC-MD5 keyed by the NT hash over the upper-cased UTF-16
/// account name concatenated with the UTF-16 target (server NetBIOS name or
/// client-claimed domain, per caller).
///
/// Requires the connection's HMAC-MD5 context to already exist.
pub fn compute_ntlmv2_hash(
    secmech: &mut SecMech,
    nt_hash: &[u8; NT_HASH_SIZE],
    account_name: &str,
    target_name: &str,
) -> SMBSecurityResult<[u8; NTLMV2_HASH_SIZE]> {
    if !secmech.hmacmd5_ready() {
        debug!("can't generate ntlmv2 hash");
        return Err(SMBSecurityError::crypto_unavailable("hmac(md5)"));
    }

    secmech.set_hmacmd5_key(nt_hash)?;
    let mac = secmech
        .hmacmd5()?
        .chain_update(utf16_le_bytes(&account_name.to_uppercase()))
        .chain_update(utf16_le_bytes(target_name))
        .finalize()
        .into_bytes();
    Ok(mac.into())
}

/// Session-key derivation shared by the NTLMv2 and SMB1 paths: HMAC-MD5
/// keyed by `hash` over the 16-byte proof value.
pub fn derive_session_key(
    secmech: &mut SecMech,
    hash: &[u8; NTLMV2_HASH_SIZE],
    proof: &[u8; SMB2_SESSKEY_SIZE],
) -> SMBSecurityResult<[u8; SMB2_SESSKEY_SIZE]> {
    secmech.alloc_hmacmd5()?;
    secmech.set_hmacmd5_key(hash)?;
    let mac = secmech.hmacmd5()?.chain_update(proof).finalize().into_bytes();
    Ok(mac.into())
}

/// NTLMv2 challenge-response verification.
///
/// `ntlmv2_response` is the full NT-challenge-response buffer: a 16-byte
/// proof followed by `blob_len` bytes of client blob. The expected proof is
/// HMAC-MD5 keyed by the NTLMv2 hash over (server challenge || blob); on a
/// match the session key is derived by re-running HMAC-MD5 keyed by the v2
/// hash over the proof. No key material is produced on a mismatch.
pub fn verify_ntlmv2(
    secmech: &mut SecMech,
    nt_hash: &[u8; NT_HASH_SIZE],
    account_name: &str,
    target_name: &str,
    server_challenge: &[u8; CRYPTO_KEY_SIZE],
    ntlmv2_response: &[u8],
    blob_len: usize,
) -> SMBSecurityResult<[u8; SESSION_KEY_SIZE]> {
    secmech.alloc_hmacmd5()?;

    if ntlmv2_response.len() < NTLMV2_HASH_SIZE
        || ntlmv2_response.len() - NTLMV2_HASH_SIZE != blob_len
    {
        return Err(SMBSecurityError::malformed_blob(format!(
            "ntlmv2 response length {} does not carry a {}-byte blob",
            ntlmv2_response.len(),
            blob_len
        )));
    }

    let ntlmv2_hash = compute_ntlmv2_hash(secmech, nt_hash, account_name, target_name)?;

    secmech.set_hmacmd5_key(&ntlmv2_hash)?;
    let expected: [u8; NTLMV2_HASH_SIZE] = secmech
        .hmacmd5()?
        .chain_update(server_challenge)
        .chain_update(&ntlmv2_response[NTLMV2_HASH_SIZE..])
        .finalize()
        .into_bytes()
        .into();

    // not a constant-time comparison; see DESIGN.md
    if expected[..] != ntlmv2_response[..NTLMV2_HASH_SIZE] {
        debug!("ntlmv2 authentication failed");
        return Err(SMBSecurityError::AuthFailed);
    }
    debug!("ntlmv2 authentication pass");

    let key = derive_session_key(secmech, &ntlmv2_hash, &expected)?;
    let mut session_key = [0u8; SESSION_KEY_SIZE];
    session_key[..SMB2_SESSKEY_SIZE].copy_from_slice(&key);
    Ok(session_key)
}

#[cfg(test)]
mod tests {
    use hmac::Hmac;
    use md5::Md5;

    use super::*;

    // MS-NLMP 4.2 reference credential: user "User", domain "Domain",
    // password "Password".
    const NT_HASH: [u8; 16] = [
        0xa4, 0xf4, 0x9c, 0x40, 0x65, 0x10, 0xbd, 0xca, 0xb6, 0x82, 0x4e, 0xe7, 0xc3, 0x0f, 0xd8,
        0x52,
    ];
    const SERVER_CHALLENGE: [u8; 8] = [0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef];

    #[test]
    fn ntlmv1_reference_vector_verifies() {
        let response: [u8; 24] = [
            0x67, 0xc4, 0x30, 0x11, 0xf3, 0x02, 0x98, 0xa2, 0xad, 0x35, 0xec, 0xe6, 0x4f, 0x16,
            0x33, 0x1c, 0x44, 0xbd, 0xbe, 0xd9, 0x27, 0x84, 0x1f, 0x94,
        ];
        let session_key = verify_ntlmv1(&NT_HASH, &SERVER_CHALLENGE, &response).unwrap();
        // MD4 of the NT hash heads the legacy session key
        let expected_head: [u8; 16] = [
            0xd8, 0x72, 0x62, 0xb0, 0xcd, 0xe4, 0xb1, 0xcb, 0x74, 0x99, 0xbe, 0xcc, 0xcd, 0xf1,
            0x07, 0x84,
        ];
        assert_eq!(session_key[..16], expected_head);
        assert_eq!(session_key[16..], response);
    }

    #[test]
    fn ntlmv1_single_bit_flip_fails() {
        let mut response: [u8; 24] = [
            0x67, 0xc4, 0x30, 0x11, 0xf3, 0x02, 0x98, 0xa2, 0xad, 0x35, 0xec, 0xe6, 0x4f, 0x16,
            0x33, 0x1c, 0x44, 0xbd, 0xbe, 0xd9, 0x27, 0x84, 0x1f, 0x94,
        ];
        response[5] ^= 0x01;
        assert_eq!(
            verify_ntlmv1(&NT_HASH, &SERVER_CHALLENGE, &response).unwrap_err(),
            SMBSecurityError::AuthFailed
        );
    }

    #[test]
    fn ntlmv2_hash_requires_allocated_context() {
        let mut secmech = SecMech::new();
        assert_eq!(
            compute_ntlmv2_hash(&mut secmech, &NT_HASH, "User", "Domain").unwrap_err(),
            SMBSecurityError::CryptoUnavailable("hmac(md5)")
        );
    }

    #[test]
    fn ntlmv2_hash_matches_reference_vector() {
        let mut secmech = SecMech::new();
        secmech.alloc_hmacmd5().unwrap();
        let hash = compute_ntlmv2_hash(&mut secmech, &NT_HASH, "User", "Domain").unwrap();
        let expected: [u8; 16] = [
            0x0c, 0x86, 0x8a, 0x40, 0x3b, 0xfd, 0x7a, 0x93, 0xa3, 0x00, 0x1e, 0xf2, 0x2e, 0xf0,
            0x2e, 0x3f,
        ];
        assert_eq!(hash, expected);
    }

    #[test]
    fn ntlmv2_round_trip_with_client_side_reference() {
        let mut secmech = SecMech::new();
        secmech.alloc_hmacmd5().unwrap();
        let ntlmv2_hash = compute_ntlmv2_hash(&mut secmech, &NT_HASH, "User", "Domain").unwrap();

        // client-side computation of the response
        let blob: Vec<u8> = [
            &[0x01, 0x01, 0, 0, 0, 0, 0, 0][..],
            &[0u8; 8],        // timestamp
            &[0xaau8; 8],     // client challenge
            &[0u8; 4],
            &[0u8; 4],        // empty target info terminator
            &[0u8; 4],
        ]
        .concat();
        let proof: [u8; 16] = <Hmac<Md5>>::new_from_slice(&ntlmv2_hash)
            .unwrap()
            .chain_update(SERVER_CHALLENGE)
            .chain_update(&blob)
            .finalize()
            .into_bytes()
            .into();
        let response = [&proof[..], &blob].concat();

        let session_key = verify_ntlmv2(
            &mut secmech,
            &NT_HASH,
            "User",
            "Domain",
            &SERVER_CHALLENGE,
            &response,
            blob.len(),
        )
        .unwrap();

        let expected_key: [u8; 16] = <Hmac<Md5>>::new_from_slice(&ntlmv2_hash)
            .unwrap()
            .chain_update(proof)
            .finalize()
            .into_bytes()
            .into();
        assert_eq!(session_key[..16], expected_key);
        assert_eq!(session_key[16..], [0u8; 24]);

        // any mutation of the response must fail verification
        let mut tampered = response.clone();
        tampered[20] ^= 0x80;
        assert_eq!(
            verify_ntlmv2(
                &mut secmech,
                &NT_HASH,
                "User",
                "Domain",
                &SERVER_CHALLENGE,
                &tampered,
                blob.len(),
            )
            .unwrap_err(),
            SMBSecurityError::AuthFailed
        );
    }

    #[test]
    fn short_ntlmv2_response_rejected() {
        let mut secmech = SecMech::new();
        let err = verify_ntlmv2(
            &mut secmech,
            &NT_HASH,
            "User",
            "Domain",
            &SERVER_CHALLENGE,
            &[0u8; 10],
            0,
        )
        .unwrap_err();
        assert!(matches!(err, SMBSecurityError::MalformedBlob(_)));
    }
}
