//! Rejection conditions shared by every ledger operation

use thiserror::Error;

/// Token-related errors
///
/// Each variant aborts the enclosing operation; no partial effect of a
/// failed operation is ever observable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Invalid target: cannot send to the zero address")]
    ZeroAddressTarget,
    #[error("Invalid source: cannot send from the zero address")]
    ZeroAddressSource,
    #[error("Invalid owner: the zero address cannot grant allowances")]
    ZeroAddressOwner,
    #[error("Invalid spender: cannot approve the zero address")]
    ZeroAddressSpender,
    #[error("Spender has no code: approve-and-call needs a deployed receiver")]
    SpenderHasNoCode,
    #[error("Insufficient balance")]
    InsufficientBalance,
    #[error("Insufficient allowance")]
    InsufficientAllowance,
    #[error("Arithmetic overflow")]
    Overflow,
    #[error("Call depth exceeded: {0}")]
    CallDepthExceeded(usize),
    #[error("Receiver rejected approval: {0}")]
    ReceiverRejected(String),
}
