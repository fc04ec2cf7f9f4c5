//! Interface of the ownership-tracking example contract.
//!
//! No network or deployment address is attached to it; callers pair it with
//! a contract instance themselves.

use crate::descriptor::Descriptor;
use crate::error::LoadError;

pub const SOURCE: &str = include_str!("../abi/owner.json");

/// Builds the owner descriptor. Call once at startup and pass the result by
/// reference.
pub fn descriptor() -> Result<Descriptor, LoadError> {
    Descriptor::load(SOURCE)
}
