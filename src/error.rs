use thiserror::Error;

/// Failure to turn descriptor input into a [`Descriptor`](crate::Descriptor).
///
/// Entry positions are zero-based indices into the descriptor array.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("entry {index}: unrecognized entry kind {kind:?} (expected constructor, event or function)")]
    UnrecognizedEntryKind { index: usize, kind: String },

    #[error("entry {index}: parameter {position} of `{list}` has no type")]
    MissingParameterType {
        index: usize,
        list: &'static str,
        position: usize,
    },

    #[error("entry {index}: invalid type {tag:?} for parameter {position} of `{list}`")]
    InvalidParameterType {
        index: usize,
        list: &'static str,
        position: usize,
        tag: String,
    },

    #[error("entry {index}: duplicate function signature {signature}")]
    DuplicateFunctionSignature { index: usize, signature: String },

    #[error("entry {index}: duplicate event name {name}")]
    DuplicateEventName { index: usize, name: String },

    #[error("entry {index}: descriptor already declares a constructor")]
    DuplicateConstructor { index: usize },

    #[error("entry {index}: invalid state mutability {value:?}")]
    InvalidMutability { index: usize, value: String },

    #[error("entry {index}: event {name} has {count} indexed inputs, at most {max} fit in log topics")]
    TooManyIndexedInputs {
        index: usize,
        name: String,
        count: usize,
        max: usize,
    },

    #[error("entry {index}: {kind} entry has no name")]
    MissingEntryName { index: usize, kind: &'static str },

    #[error("artifact has no ABI")]
    MissingAbi,

    #[error("malformed descriptor: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read descriptor: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure to encode or decode data against a descriptor entry.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("expected {expected} values, got {found}")]
    ArityMismatch { expected: usize, found: usize },

    #[error("value {index} does not match parameter type {expected}")]
    TypeMismatch { index: usize, expected: String },

    #[error("call data selector {found} does not match {expected}")]
    SelectorMismatch { expected: String, found: String },

    #[error("log topics do not match event {event}")]
    TopicMismatch { event: String },

    #[error(transparent)]
    Abi(#[from] ethers::abi::Error),
}

/// Failure to parse a textual argument for a given parameter type.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgError {
    #[error("invalid address {0:?} (must be 0x followed by 40 hex digits)")]
    InvalidAddress(String),

    #[error("invalid integer {0:?}")]
    InvalidInteger(String),

    #[error("{value} does not fit in {kind}")]
    OutOfRange { value: String, kind: String },

    #[error("invalid bool {0:?} (expected true or false)")]
    InvalidBool(String),

    #[error("invalid hex {0:?}")]
    InvalidHex(String),

    #[error("expected {expected} bytes, got {found}")]
    WrongLength { expected: usize, found: usize },

    #[error("arguments of type {0} cannot be given as text")]
    Unsupported(String),
}
