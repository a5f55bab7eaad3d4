use crate::endpoint::State;

/// Error taxonomy for every fallible microTCP operation.
///
/// `AllocFailure` and `EntropyFailure` are the only variants the design
/// treats as fatal (see spec §7); everything else is a normal, recoverable
/// `Result::Err` that the caller is expected to propagate.
#[derive(Debug, thiserror::Error)]
pub enum MicrotcpError {
    #[error("operation requires state {expected:?}, found {actual:?}")]
    WrongState { expected: State, actual: State },

    #[error("segment failed integrity check: {reason}")]
    IntegrityError { reason: &'static str },

    #[error("endpoint is not connected (state {0:?})")]
    NotConnected(State),

    #[error("underlying datagram I/O failed: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to allocate receive buffer")]
    AllocFailure,

    #[error("failed to obtain entropy for initial sequence number key")]
    EntropyFailure,
}

pub type Result<T> = std::result::Result<T, MicrotcpError>;
