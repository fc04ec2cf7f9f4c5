use sha3::{Digest, Keccak256};

use crate::types::Param;

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&Keccak256::digest(data));
    hash
}

/// Build a canonical signature string (e.g. "transfer(address,uint256)").
pub fn canonical_signature(name: &str, params: &[Param]) -> String {
    let param_types: Vec<String> = params.iter().map(|param| param.kind.to_string()).collect();

    format!("{}({})", name, param_types.join(","))
}

pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}
