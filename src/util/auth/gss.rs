//! Fixed GSS-API/SPNEGO wrappers spliced ahead of the NTLMSSP payload by
//! the session-setup dispatcher. The negotiate header carries the fixed
//! string "not_defined_in_RFC4178@please_ignore", so all three blobs can be
//! emitted statically.

/// Mechanism wrapper for the negotiate-protocol response.
pub const NEGOTIATE_GSS_HEADER: [u8; 74] = [
    0x60, 0x48, 0x06, 0x06, 0x2b, 0x06, 0x01, 0x05,
    0x05, 0x02, 0xa0, 0x3e, 0x30, 0x3c, 0xa0, 0x0e,
    0x30, 0x0c, 0x06, 0x0a, 0x2b, 0x06, 0x01, 0x04,
    0x01, 0x82, 0x37, 0x02, 0x02, 0x0a, 0xa3, 0x2a,
    0x30, 0x28, 0xa0, 0x26, 0x1b, 0x24, 0x6e, 0x6f,
    0x74, 0x5f, 0x64, 0x65, 0x66, 0x69, 0x6e, 0x65,
    0x64, 0x5f, 0x69, 0x6e, 0x5f, 0x52, 0x46, 0x43,
    0x34, 0x31, 0x37, 0x38, 0x40, 0x70, 0x6c, 0x65,
    0x61, 0x73, 0x65, 0x5f, 0x69, 0x67, 0x6e, 0x6f,
    0x72, 0x65,
];

/// SecurityBuffer wrapper for the session-setup negotiate (challenge) phase.
pub const SESSION_NEGOTIATE_GSS_HEADER: [u8; 31] = [
    0xa1, 0x81, 0xbe, 0x30, 0x81, 0xbb, 0xa0, 0x03,
    0x0a, 0x01, 0x01, 0xa1, 0x0c, 0x06, 0x0a, 0x2b,
    0x06, 0x01, 0x04, 0x01, 0x82, 0x37, 0x02, 0x02,
    0x0a, 0xa2, 0x81, 0xa5, 0x04, 0x81, 0xa2,
];

/// SecurityBuffer wrapper for the session-setup authenticate phase.
pub const SESSION_AUTHENTICATE_GSS_HEADER: [u8; 9] = [
    0xa1, 0x07, 0x30, 0x05, 0xa0, 0x03, 0x0a, 0x01,
    0x00,
];
