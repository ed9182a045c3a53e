pub mod des;
pub mod ntlm;
pub mod preauth;
pub mod secmech;
pub mod signing;
pub mod sp800_108;

/// NT password hash ("NTOWF") size.
pub const NT_HASH_SIZE: usize = 16;
/// NTLMv2 hash and NtProofStr size.
pub const NTLMV2_HASH_SIZE: usize = 16;
/// Fixed NTLMv1 challenge-response size; also selects the NTLMv1 path.
pub const AUTH_RESP_SIZE: usize = 24;
/// Server challenge size.
pub const CRYPTO_KEY_SIZE: usize = 8;
/// Legacy (SMB1) head of the session key.
pub const SMB1_SESSKEY_SIZE: usize = 16;
/// Full dialect-independent session-key field: legacy hash + response.
pub const SESSION_KEY_SIZE: usize = SMB1_SESSKEY_SIZE + AUTH_RESP_SIZE;
/// SMB2/SMB3 session-key material consumed by signing and derivation.
pub const SMB2_SESSKEY_SIZE: usize = 16;
/// HMAC-SHA256 output size.
pub const HMAC_SHA256_SIZE: usize = 32;
/// AES-CMAC key and MAC size.
pub const CMAC_AES_SIZE: usize = 16;
/// SHA-512 output size; also the running preauth-hash accumulator size.
pub const SHA512_SIZE: usize = 64;
