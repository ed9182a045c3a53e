use std::fmt::{Display, Formatter};

use nom::error::Error;
use nom::Err;

pub type SMBSecurityResult<T> = Result<T, SMBSecurityError>;

/// Request-scoped failures of the security subsystem. All variants are
/// returned to the dispatcher as-is; none is retried internally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SMBSecurityError {
    /// Undersized buffer, bad NTLMSSP signature, or an out-of-bounds
    /// security-buffer reference in a client blob.
    MalformedBlob(String),
    /// The required primitive context has not been allocated.
    CryptoUnavailable(&'static str),
    /// A primitive step (key-set, update, finalize) rejected its input.
    CryptoOperationFailed(String),
    /// Well-formed blob and clean crypto execution, but the computed
    /// response does not match the client's.
    AuthFailed,
    /// An auxiliary buffer could not be obtained.
    AllocationFailed(String),
}

impl SMBSecurityError {
    pub fn malformed_blob<T: Into<String>>(message: T) -> Self {
        Self::MalformedBlob(message.into())
    }

    pub fn crypto_unavailable(primitive: &'static str) -> Self {
        Self::CryptoUnavailable(primitive)
    }

    pub fn crypto_failed<T: Into<String>>(message: T) -> Self {
        Self::CryptoOperationFailed(message.into())
    }

    pub fn allocation_failed<T: Into<String>>(message: T) -> Self {
        Self::AllocationFailed(message.into())
    }
}

impl Display for SMBSecurityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedBlob(x) => write!(f, "Malformed security blob: {}", x),
            Self::CryptoUnavailable(x) => write!(f, "Crypto context unavailable: {}", x),
            Self::CryptoOperationFailed(x) => write!(f, "Crypto operation failed: {}", x),
            Self::AuthFailed => write!(f, "Authentication failed"),
            Self::AllocationFailed(x) => write!(f, "Allocation failed: {}", x),
        }
    }
}

impl std::error::Error for SMBSecurityError {}

impl<I> From<Err<Error<I>>> for SMBSecurityError {
    fn from(err: Err<Error<I>>) -> Self {
        match err {
            Err::Error(x) | Err::Failure(x) => {
                Self::MalformedBlob(format!("parse error with kind: {:?}", x.code))
            }
            Err::Incomplete(_) => Self::MalformedBlob("incomplete blob".into()),
        }
    }
}
