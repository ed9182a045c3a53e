/// Authentication: NTLMSSP codec, provider, credentials, GSS constants.
pub mod auth;
/// Cryptographic building blocks layered over externally supplied primitives.
pub mod crypto;
