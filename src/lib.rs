//! Loading and validation of Solidity JSON interface descriptors (ABIs),
//! with selector computation and call / log encoding on top.

pub mod args;
pub mod artifact;
pub mod codec;
pub mod descriptor;
pub mod error;
mod loader;
pub mod owner;
pub mod signature;
pub mod types;

pub use codec::{DecodedLog, LogValue};
pub use descriptor::{Constructor, Descriptor, Entry, Event, Function};
pub use error::{ArgError, CodecError, LoadError};
pub use types::{AbiType, Param, StateMutability};
