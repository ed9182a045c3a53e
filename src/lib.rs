//! # SMB Auth
//!
//! The authentication and packet-integrity subsystem of an SMB file server:
//! NTLMSSP handshake decoding/encoding, NTLMv1/NTLMv2 credential
//! verification, SMB2/SMB3 signing-key derivation, per-dialect packet
//! signing and the SMB 3.1.1 pre-authentication integrity hash.
//!
//! This crate provides:
//! - **Protocol layer** ([`protocol`]): the negotiated dialect identifier.
//! - **Server layer** ([`server`]): connection-, session- and channel-scoped
//!   security state (cached primitive contexts, session keys, channel
//!   signing keys, the running preauth hash).
//! - **Utilities** ([`util`]): the NTLMSSP wire codec and authentication
//!   provider, and the cryptographic building blocks (SP800-108 KDF,
//!   HMAC-MD5/HMAC-SHA256 chains, AES-CMAC and MD5 signing, SHA-512
//!   preauth hashing).
//!
//! Transport I/O, command dispatch and the credential database are external
//! collaborators: the dispatcher hands raw security blobs to
//! [`util::auth::ntlm::NTLMAuthProvider`] and signs PDUs through
//! [`server::SMBConnection`] and [`server::SMBChannel`].

/// Typed errors returned to the SMB command dispatcher.
pub mod error;
/// Wire-format protocol types shared with the outer server.
pub mod protocol;
/// Connection, session and channel security state.
pub mod server;
/// Authentication (NTLMSSP) and cryptographic utility modules.
pub mod util;
mod byte_helper;
