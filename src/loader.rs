//! Parsing and validation of JSON interface descriptors.

use std::collections::HashSet;
use std::fs;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::artifact;
use crate::descriptor::{Constructor, Descriptor, Entry, Event, Function};
use crate::error::LoadError;
use crate::types::{AbiType, Param, StateMutability};

#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(rename = "type")]
    kind: Option<Value>,
    name: Option<String>,
    inputs: Option<Vec<RawParam>>,
    outputs: Option<Vec<RawParam>>,
    #[serde(rename = "stateMutability")]
    state_mutability: Option<Value>,
    // pre-0.4.16 compilers emit these instead of stateMutability
    constant: Option<bool>,
    payable: Option<bool>,
    anonymous: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawParam {
    name: Option<String>,
    #[serde(rename = "type")]
    kind: Option<Value>,
    #[serde(rename = "internalType")]
    internal_type: Option<String>,
    indexed: Option<bool>,
    components: Option<Vec<RawParam>>,
}

impl Descriptor {
    /// Parses and validates descriptor JSON text (a bare ABI array).
    pub fn load(source: &str) -> Result<Self, LoadError> {
        let raw: Vec<RawEntry> = serde_json::from_str(source)?;
        build(raw)
    }

    pub fn from_value(value: Value) -> Result<Self, LoadError> {
        let raw: Vec<RawEntry> = serde_json::from_value(value)?;
        build(raw)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, LoadError> {
        let raw: Vec<RawEntry> = serde_json::from_reader(reader)?;
        build(raw)
    }

    /// Loads a compiler artifact or a bare ABI array from `path`.
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let content = fs::read_to_string(path)?;
        let descriptor = Self::from_artifact(&content)?;
        debug!("Loaded {} entries from {}", descriptor.len(), path.display());
        Ok(descriptor)
    }

    /// Accepts a bare ABI array or a forge/solc artifact carrying one under
    /// its `abi` key.
    pub fn from_artifact(source: &str) -> Result<Self, LoadError> {
        let value: Value = serde_json::from_str(source)?;
        Self::from_value(artifact::extract_abi(value)?)
    }
}

impl FromStr for Descriptor {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::load(s)
    }
}

fn build(raw: Vec<RawEntry>) -> Result<Descriptor, LoadError> {
    let mut entries = Vec::with_capacity(raw.len());
    let mut has_constructor = false;
    let mut function_signatures = HashSet::new();
    let mut event_names = HashSet::new();

    for (index, raw_entry) in raw.into_iter().enumerate() {
        let entry = build_entry(index, raw_entry)?;

        match &entry {
            Entry::Constructor(_) => {
                if has_constructor {
                    return Err(LoadError::DuplicateConstructor { index });
                }
                has_constructor = true;
            }
            Entry::Function(function) => {
                let signature = function.signature();
                if !function_signatures.insert(signature.clone()) {
                    return Err(LoadError::DuplicateFunctionSignature { index, signature });
                }
            }
            Entry::Event(event) => {
                if !event_names.insert(event.name.clone()) {
                    return Err(LoadError::DuplicateEventName {
                        index,
                        name: event.name.clone(),
                    });
                }
            }
        }

        entries.push(entry);
    }

    debug!(
        "Validated descriptor: {} functions, {} events, constructor: {}",
        function_signatures.len(),
        event_names.len(),
        has_constructor
    );

    Ok(Descriptor { entries })
}

fn build_entry(index: usize, raw: RawEntry) -> Result<Entry, LoadError> {
    // non-string tags are reported by their JSON text
    let kind = match &raw.kind {
        Some(Value::String(kind)) => kind.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    };

    match kind.as_str() {
        "constructor" => {
            let state_mutability = resolve_mutability(index, &raw)?;
            if state_mutability.is_read_only() {
                return Err(LoadError::InvalidMutability {
                    index,
                    value: state_mutability.to_string(),
                });
            }
            Ok(Entry::Constructor(Constructor {
                inputs: build_params(index, "inputs", raw.inputs, false)?,
                state_mutability,
            }))
        }
        "function" => {
            let state_mutability = resolve_mutability(index, &raw)?;
            let name = raw.name.ok_or(LoadError::MissingEntryName { index, kind: "function" })?;
            Ok(Entry::Function(Function {
                name,
                inputs: build_params(index, "inputs", raw.inputs, false)?,
                outputs: build_params(index, "outputs", raw.outputs, false)?,
                state_mutability,
            }))
        }
        "event" => {
            let name = raw.name.ok_or(LoadError::MissingEntryName { index, kind: "event" })?;
            let inputs = build_params(index, "inputs", raw.inputs, true)?;
            let anonymous = raw.anonymous.unwrap_or(false);

            // topic0 holds the signature hash unless the event is anonymous
            let max = if anonymous { 4 } else { 3 };
            let count = inputs.iter().filter(|param| param.indexed).count();
            if count > max {
                return Err(LoadError::TooManyIndexedInputs { index, name, count, max });
            }

            Ok(Entry::Event(Event {
                name,
                inputs,
                anonymous,
            }))
        }
        other => Err(LoadError::UnrecognizedEntryKind {
            index,
            kind: other.to_string(),
        }),
    }
}

fn resolve_mutability(index: usize, raw: &RawEntry) -> Result<StateMutability, LoadError> {
    match &raw.state_mutability {
        Some(Value::String(tag)) => tag.parse().map_err(|_| LoadError::InvalidMutability {
            index,
            value: tag.to_string(),
        }),
        Some(other) => Err(LoadError::InvalidMutability {
            index,
            value: other.to_string(),
        }),
        None if raw.payable == Some(true) => Ok(StateMutability::Payable),
        None if raw.constant == Some(true) => Ok(StateMutability::View),
        None => Ok(StateMutability::NonPayable),
    }
}

fn build_params(
    index: usize,
    list: &'static str,
    raw: Option<Vec<RawParam>>,
    allow_indexed: bool,
) -> Result<Vec<Param>, LoadError> {
    raw.unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(position, param)| build_param(index, list, position, param, allow_indexed))
        .collect()
}

fn build_param(
    index: usize,
    list: &'static str,
    position: usize,
    raw: RawParam,
    allow_indexed: bool,
) -> Result<Param, LoadError> {
    let type_tag = match raw.kind {
        Some(Value::String(tag)) => tag,
        Some(other) => {
            return Err(LoadError::InvalidParameterType {
                index,
                list,
                position,
                tag: other.to_string(),
            })
        }
        None => return Err(LoadError::MissingParameterType { index, list, position }),
    };

    // Components never carry `indexed`; only top-level event inputs do.
    let components = match raw.components {
        Some(members) => Some(
            members
                .into_iter()
                .enumerate()
                .map(|(i, member)| build_param(index, "components", i, member, false))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        None => None,
    };
    let component_kinds: Option<Vec<AbiType>> = components
        .as_ref()
        .map(|members| members.iter().map(|member| member.kind.clone()).collect());

    let kind = AbiType::parse(&type_tag, component_kinds.as_deref()).ok_or_else(|| {
        LoadError::InvalidParameterType {
            index,
            list,
            position,
            tag: type_tag.clone(),
        }
    })?;

    Ok(Param {
        name: raw.name.unwrap_or_default(),
        type_tag,
        kind,
        internal_type: raw.internal_type,
        indexed: allow_indexed && raw.indexed.unwrap_or(false),
        components: components.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn load(value: Value) -> Result<Descriptor, LoadError> {
        Descriptor::from_value(value)
    }

    #[test]
    fn rejects_unknown_entry_kind() {
        let err = load(json!([{ "type": "unknown", "inputs": [] }])).unwrap_err();
        assert!(matches!(err, LoadError::UnrecognizedEntryKind { index: 0, ref kind } if kind == "unknown"));
    }

    #[test]
    fn rejects_entry_without_kind() {
        let err = load(json!([{ "name": "f", "inputs": [] }])).unwrap_err();
        assert!(matches!(err, LoadError::UnrecognizedEntryKind { ref kind, .. } if kind.is_empty()));
    }

    #[test]
    fn fallback_and_receive_are_not_accepted() {
        for kind in ["fallback", "receive", "error"] {
            let err = load(json!([{ "type": kind, "stateMutability": "payable" }])).unwrap_err();
            assert!(matches!(err, LoadError::UnrecognizedEntryKind { .. }));
        }
    }

    #[test]
    fn rejects_parameter_without_type() {
        let err = load(json!([
            { "type": "function", "name": "f", "inputs": [{ "name": "a" }], "outputs": [], "stateMutability": "view" }
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            LoadError::MissingParameterType { index: 0, list: "inputs", position: 0 }
        ));
    }

    #[test]
    fn rejects_output_without_type() {
        let err = load(json!([
            { "type": "function", "name": "f", "inputs": [], "outputs": [{ "name": "" }], "stateMutability": "view" }
        ]))
        .unwrap_err();
        assert!(matches!(err, LoadError::MissingParameterType { list: "outputs", .. }));
    }

    #[test]
    fn non_string_entry_kind_is_unrecognized() {
        let err = load(json!([{ "type": 123, "inputs": [] }])).unwrap_err();
        assert!(matches!(err, LoadError::UnrecognizedEntryKind { index: 0, ref kind } if kind == "123"));
    }

    #[test]
    fn non_string_mutability_is_invalid() {
        let err = load(json!([
            { "type": "function", "name": "f", "inputs": [], "stateMutability": 7 }
        ]))
        .unwrap_err();
        assert!(matches!(err, LoadError::InvalidMutability { index: 0, ref value } if value == "7"));
    }

    #[test]
    fn non_string_parameter_type_is_invalid() {
        let err = load(json!([
            { "type": "function", "name": "f", "inputs": [{ "name": "a", "type": 5 }], "stateMutability": "view" }
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            LoadError::InvalidParameterType { index: 0, list: "inputs", position: 0, ref tag } if tag == "5"
        ));
    }

    #[test]
    fn component_errors_point_at_the_component() {
        let err = load(json!([
            { "type": "function", "name": "f", "stateMutability": "view", "inputs": [
                { "name": "a", "type": "address" },
                { "name": "t", "type": "tuple", "components": [{ "name": "x", "type": "bool" }, { "name": "y" }] }
            ] }
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            LoadError::MissingParameterType { index: 0, list: "components", position: 1 }
        ));
    }

    #[test]
    fn events_are_limited_to_the_available_topics() {
        let indexed = |n: usize| -> Vec<Value> {
            (0..n)
                .map(|i| json!({ "name": format!("p{}", i), "type": "uint256", "indexed": true }))
                .collect()
        };

        let err = load(json!([{ "type": "event", "name": "E", "anonymous": false, "inputs": indexed(4) }])).unwrap_err();
        assert!(matches!(err, LoadError::TooManyIndexedInputs { count: 4, max: 3, .. }));

        assert!(load(json!([{ "type": "event", "name": "E", "anonymous": false, "inputs": indexed(3) }])).is_ok());
        assert!(load(json!([{ "type": "event", "name": "E", "anonymous": true, "inputs": indexed(4) }])).is_ok());

        let err = load(json!([{ "type": "event", "name": "E", "anonymous": true, "inputs": indexed(5) }])).unwrap_err();
        assert!(matches!(err, LoadError::TooManyIndexedInputs { count: 5, max: 4, .. }));
    }

    #[test]
    fn rejects_invalid_mutability() {
        let err = load(json!([
            { "type": "function", "name": "f", "inputs": [], "stateMutability": "constant" }
        ]))
        .unwrap_err();
        assert!(matches!(err, LoadError::InvalidMutability { ref value, .. } if value == "constant"));
    }

    #[test]
    fn constructor_cannot_be_view() {
        let err = load(json!([{ "type": "constructor", "inputs": [], "stateMutability": "view" }])).unwrap_err();
        assert!(matches!(err, LoadError::InvalidMutability { index: 0, .. }));
    }

    #[test]
    fn legacy_flags_resolve_mutability() {
        let descriptor = load(json!([
            { "type": "function", "name": "get", "inputs": [], "outputs": [], "constant": true },
            { "type": "function", "name": "pay", "inputs": [], "outputs": [], "constant": false, "payable": true },
            { "type": "function", "name": "set", "inputs": [], "outputs": [] }
        ]))
        .unwrap();
        assert_eq!(descriptor.find_function("get")[0].state_mutability, StateMutability::View);
        assert_eq!(descriptor.find_function("pay")[0].state_mutability, StateMutability::Payable);
        assert_eq!(descriptor.find_function("set")[0].state_mutability, StateMutability::NonPayable);
    }

    #[test]
    fn duplicate_signature_uses_canonical_types() {
        let err = load(json!([
            { "type": "function", "name": "f", "inputs": [{ "name": "a", "type": "uint" }], "stateMutability": "view" },
            { "type": "function", "name": "f", "inputs": [{ "name": "b", "type": "uint256" }], "stateMutability": "pure" }
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            LoadError::DuplicateFunctionSignature { index: 1, ref signature } if signature == "f(uint256)"
        ));
    }

    #[test]
    fn overloads_with_distinct_inputs_are_allowed() {
        let descriptor = load(json!([
            { "type": "function", "name": "f", "inputs": [], "stateMutability": "view" },
            { "type": "function", "name": "f", "inputs": [{ "name": "a", "type": "address" }], "stateMutability": "view" }
        ]))
        .unwrap();
        assert_eq!(descriptor.find_function("f").len(), 2);
    }

    #[test]
    fn duplicate_event_names_are_rejected_even_with_different_inputs() {
        let err = load(json!([
            { "type": "event", "name": "E", "inputs": [], "anonymous": false },
            { "type": "event", "name": "E", "inputs": [{ "name": "a", "type": "bool" }], "anonymous": false }
        ]))
        .unwrap_err();
        assert!(matches!(err, LoadError::DuplicateEventName { index: 1, ref name } if name == "E"));
    }

    #[test]
    fn second_constructor_is_rejected() {
        let err = load(json!([
            { "type": "constructor", "inputs": [] },
            { "type": "constructor", "inputs": [] }
        ]))
        .unwrap_err();
        assert!(matches!(err, LoadError::DuplicateConstructor { index: 1 }));
    }

    #[test]
    fn functions_and_events_need_names() {
        let err = load(json!([{ "type": "event", "inputs": [] }])).unwrap_err();
        assert!(matches!(err, LoadError::MissingEntryName { kind: "event", .. }));
    }

    #[test]
    fn indexed_is_dropped_outside_event_inputs() {
        let descriptor = load(json!([
            { "type": "function", "name": "f", "inputs": [{ "name": "a", "type": "address", "indexed": true }], "stateMutability": "view" }
        ]))
        .unwrap();
        assert!(!descriptor.find_function("f")[0].inputs[0].indexed);
    }

    #[test]
    fn tuple_components_build_nested_types() {
        let descriptor = load(json!([{
            "type": "function",
            "name": "submit",
            "inputs": [{
                "name": "orders",
                "type": "tuple[]",
                "internalType": "struct Book.Order[]",
                "components": [
                    { "name": "maker", "type": "address" },
                    { "name": "amount", "type": "uint" }
                ]
            }],
            "outputs": [],
            "stateMutability": "nonpayable"
        }]))
        .unwrap();
        let submit = descriptor.find_function("submit")[0];
        assert_eq!(submit.signature(), "submit((address,uint256)[])");
        assert_eq!(submit.inputs[0].components.len(), 2);
        assert_eq!(submit.inputs[0].internal_type.as_deref(), Some("struct Book.Order[]"));
    }

    #[test]
    fn tuple_without_components_is_invalid() {
        let err = load(json!([
            { "type": "function", "name": "f", "inputs": [{ "name": "t", "type": "tuple" }], "stateMutability": "view" }
        ]))
        .unwrap_err();
        assert!(matches!(err, LoadError::InvalidParameterType { ref tag, .. } if tag == "tuple"));
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(Descriptor::load("[{"), Err(LoadError::Json(_))));
        assert!(matches!(Descriptor::load("{}"), Err(LoadError::Json(_))));
    }

    #[test]
    fn serialized_descriptor_loads_back_to_itself() {
        let source = json!([
            { "type": "constructor", "inputs": [{ "name": "owner", "type": "address" }], "stateMutability": "payable" },
            { "type": "event", "name": "Moved", "inputs": [{ "name": "to", "type": "address", "indexed": true }], "anonymous": true },
            { "type": "function", "name": "f", "inputs": [], "outputs": [{ "name": "", "type": "bytes32" }], "stateMutability": "pure" }
        ]);
        let descriptor = load(source).unwrap();
        let reloaded = load(serde_json::to_value(&descriptor).unwrap()).unwrap();
        assert_eq!(descriptor, reloaded);
    }

    fn arb_type_tag() -> impl Strategy<Value = &'static str> {
        prop::sample::select(vec!["address", "bool", "uint256", "uint8", "int", "bytes", "bytes32", "string", "address[]"])
    }

    fn arb_entry() -> impl Strategy<Value = Value> {
        (
            prop::sample::select(vec!["function", "event"]),
            "[a-z][a-zA-Z0-9]{0,8}",
            prop::collection::vec(arb_type_tag(), 0..4),
            prop::sample::select(vec!["pure", "view", "nonpayable", "payable"]),
        )
            .prop_map(|(kind, name, tags, mutability)| {
                let inputs: Vec<Value> = tags
                    .iter()
                    .enumerate()
                    .map(|(i, tag)| json!({ "name": format!("p{}", i), "type": tag, "indexed": (kind == "event" && i == 0) }))
                    .collect();
                json!({
                    "type": kind,
                    "name": name,
                    "inputs": inputs,
                    "outputs": [],
                    "stateMutability": mutability,
                    "anonymous": false
                })
            })
    }

    proptest! {
        #[test]
        fn load_is_idempotent(entries in prop::collection::vec(arb_entry(), 0..8)) {
            let source = Value::Array(entries).to_string();
            match (Descriptor::load(&source), Descriptor::load(&source)) {
                (Ok(first), Ok(second)) => prop_assert_eq!(first, second),
                (Err(first), Err(second)) => prop_assert_eq!(first.to_string(), second.to_string()),
                _ => prop_assert!(false, "loading the same input gave different outcomes"),
            }
        }
    }
}
