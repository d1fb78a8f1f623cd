use thiserror::Error;

use crate::amount::Amount;
use crate::common::{Address, Coordinate};

/// Kind-specific rule violations detected during validation or execution.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("amount {0} is below the dust threshold")]
    DustAmount(Amount),
    #[error("chain {0} is not the main chain")]
    NotMainChain(Coordinate),
    #[error("sender and receiver are the same account")]
    SelfTransfer,
    #[error("transaction for chain {got} submitted to chain {expected}")]
    WrongChain { expected: Coordinate, got: Coordinate },
    #[error("required signer count {required} exceeds {keys} keys")]
    InvalidThreshold { required: u8, keys: usize },
}

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Unknown kind: {0}")]
    UnknownKind(String),
    #[error("Malformed encoding after {consumed} bytes: {reason}")]
    MalformedEncoding { consumed: usize, reason: String },
    #[error("Invalid sequence: got {got}, account is at {current}")]
    InvalidSequence { got: u64, current: u64 },
    #[error("Invalid signer count: expected {expected}, got {got}")]
    InvalidSignerCount { expected: usize, got: usize },
    #[error("Invalid account signer")]
    InvalidAccountSigner,
    #[error("Structural violation: {0}")]
    StructuralViolation(Violation),
    #[error("Insufficient balance: {available} available, {required} required")]
    InsufficientBalance { available: Amount, required: Amount },
    #[error("Account not found: {0}")]
    AccountNotFound(Address),
    #[error("Account already exists: {0}")]
    AccountAlreadyExists(Address),
    #[error("Duplicate kind registration: {0}")]
    DuplicateKind(String),
    #[error("Instance does not match kind {0}")]
    KindMismatch(String),
    #[error("Amount overflow")]
    AmountOverflow,
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid signature")]
    InvalidSignature,
    #[error("Config error: {0}")]
    Config(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Coarse grouping of [`LedgerError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnknownKind,
    MalformedEncoding,
    InvalidSequence,
    InvalidSigner,
    StructuralViolation,
    InsufficientBalance,
    Other,
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::UnknownKind(_) => ErrorKind::UnknownKind,
            LedgerError::MalformedEncoding { .. } => ErrorKind::MalformedEncoding,
            LedgerError::InvalidSequence { .. } => ErrorKind::InvalidSequence,
            LedgerError::InvalidSignerCount { .. }
            | LedgerError::InvalidAccountSigner
            | LedgerError::InvalidSignature => ErrorKind::InvalidSigner,
            LedgerError::StructuralViolation(_) => ErrorKind::StructuralViolation,
            LedgerError::InsufficientBalance { .. } => ErrorKind::InsufficientBalance,
            _ => ErrorKind::Other,
        }
    }

    pub(crate) fn malformed(consumed: usize, reason: impl Into<String>) -> Self {
        LedgerError::MalformedEncoding {
            consumed,
            reason: reason.into(),
        }
    }
}

impl From<Violation> for LedgerError {
    fn from(v: Violation) -> Self {
        LedgerError::StructuralViolation(v)
    }
}

impl From<bincode::Error> for LedgerError {
    fn from(e: bincode::Error) -> Self {
        LedgerError::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(e: serde_json::Error) -> Self {
        LedgerError::Serialization(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
