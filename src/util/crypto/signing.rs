use digest::Digest;
use hmac::Mac;
use tracing::trace;

use crate::error::SMBSecurityResult;
use crate::protocol::dialect::SMBDialect;
use crate::util::crypto::secmech::SecMech;
use crate::util::crypto::{
    sp800_108, CMAC_AES_SIZE, HMAC_SHA256_SIZE, SESSION_KEY_SIZE, SHA512_SIZE, SMB2_SESSKEY_SIZE,
};

/// Dialect-specific key material for one signing operation.
pub enum SigningContext<'a> {
    Smb1 {
        session_key: &'a [u8; SESSION_KEY_SIZE],
    },
    Smb2 {
        session_key: &'a [u8; SESSION_KEY_SIZE],
    },
    Smb3 {
        signing_key: &'a [u8; CMAC_AES_SIZE],
    },
}

/// Computes the message authentication code over a full PDU for whichever
/// dialect the connection negotiated. Any failure means the PDU must not be
/// trusted.
pub fn calculate_signature(
    secmech: &mut SecMech,
    context: SigningContext,
    pdu: &[u8],
) -> SMBSecurityResult<Vec<u8>> {
    match context {
        SigningContext::Smb1 { session_key } => sign_smb1(secmech, session_key, pdu).map(Vec::from),
        SigningContext::Smb2 { session_key } => sign_smb2(secmech, session_key, pdu).map(Vec::from),
        SigningContext::Smb3 { signing_key } => sign_smb3(secmech, signing_key, pdu).map(Vec::from),
    }
}

/// SMB1 signature: plain MD5 over the first 40 bytes of session key
/// followed by the PDU.
pub fn sign_smb1(
    secmech: &mut SecMech,
    session_key: &[u8; SESSION_KEY_SIZE],
    pdu: &[u8],
) -> SMBSecurityResult<[u8; 16]> {
    secmech.alloc_md5()?;
    let digest = secmech
        .md5()?
        .chain_update(session_key)
        .chain_update(pdu)
        .finalize();
    Ok(digest.into())
}

/// SMB2 signature: HMAC-SHA256 keyed by the 16-byte session-key slice.
pub fn sign_smb2(
    secmech: &mut SecMech,
    session_key: &[u8; SESSION_KEY_SIZE],
    pdu: &[u8],
) -> SMBSecurityResult<[u8; HMAC_SHA256_SIZE]> {
    secmech.alloc_hmacsha256()?;
    secmech.set_hmacsha256_key(&session_key[..SMB2_SESSKEY_SIZE])?;
    let mac = secmech
        .hmacsha256()?
        .chain_update(pdu)
        .finalize()
        .into_bytes();
    Ok(mac.into())
}

/// SMB3 signature: CMAC-AES keyed by the channel's derived signing key.
pub fn sign_smb3(
    secmech: &mut SecMech,
    signing_key: &[u8; CMAC_AES_SIZE],
    pdu: &[u8],
) -> SMBSecurityResult<[u8; CMAC_AES_SIZE]> {
    secmech.alloc_cmacaes()?;
    secmech.set_cmacaes_key(signing_key)?;
    let mac = secmech.cmacaes()?.chain_update(pdu).finalize().into_bytes();
    Ok(mac.into())
}

/// Derives the dialect-specific signing key from the session key.
///
/// SMB3 dialects run the SP800-108 counter KDF keyed by the 16-byte session
/// key slice; SMB 3.1.1 binds the running preauth hash as the KDF context
/// while 3.0/3.0.2 use the fixed `SmbSign` context. Pre-3.0 dialects sign
/// with the session key directly, so it is passed through.
pub fn compute_signing_key(
    secmech: &mut SecMech,
    session_key: &[u8; SESSION_KEY_SIZE],
    dialect: SMBDialect,
    preauth_hash: &[u8; SHA512_SIZE],
    key_size: usize,
) -> SMBSecurityResult<Vec<u8>> {
    if !dialect.is_smb3() {
        return Ok(session_key[..key_size.min(SMB2_SESSKEY_SIZE)].to_vec());
    }

    secmech.alloc_hmacsha256()?;
    secmech.alloc_cmacaes()?;
    secmech.set_hmacsha256_key(&session_key[..SMB2_SESSKEY_SIZE])?;

    let label: &[u8] = if dialect == SMBDialect::V3_1_1 {
        b"SMBSigningKey\0"
    } else {
        b"SMB2AESCMAC\0"
    };
    let context: &[u8] = if dialect == SMBDialect::V3_1_1 {
        preauth_hash
    } else {
        b"SmbSign\0"
    };

    trace!(?dialect, "deriving signing key");
    let mac = secmech.hmacsha256()?;
    Ok(sp800_108::derive_key(mac, label, context, key_size))
}
