use serde_json::Value;

use crate::error::LoadError;

/// Pull the ABI array out of a compiler artifact.
///
/// Forge artifacts (`out/Name.sol/Name.json`) carry `abi` as an array, solc
/// `--combined-json` contract objects carry it as a JSON string. A bare array
/// is returned unchanged.
pub fn extract_abi(artifact: Value) -> Result<Value, LoadError> {
    match artifact {
        Value::Array(_) => Ok(artifact),
        Value::Object(mut fields) => match fields.remove("abi") {
            Some(Value::String(encoded)) => Ok(serde_json::from_str(&encoded)?),
            Some(abi @ Value::Array(_)) => Ok(abi),
            _ => Err(LoadError::MissingAbi),
        },
        _ => Err(LoadError::MissingAbi),
    }
}

/// Find a contract in solc `--combined-json` output and return its ABI.
///
/// Contracts are keyed as `"path/to/File.sol:ContractName"`.
pub fn extract_contract_abi(output: Value, contract_name: &str) -> Result<Value, LoadError> {
    let suffix = format!(":{}", contract_name);
    let contract = match output {
        Value::Object(mut fields) => match fields.remove("contracts") {
            Some(Value::Object(contracts)) => contracts
                .into_iter()
                .find(|(key, _)| key.ends_with(&suffix) || key == contract_name)
                .map(|(_, contract)| contract),
            _ => None,
        },
        _ => None,
    };

    extract_abi(contract.ok_or(LoadError::MissingAbi)?)
}
