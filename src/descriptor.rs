use serde::Serialize;

use crate::signature::{canonical_signature, keccak256, selector, to_hex};
use crate::types::{Param, StateMutability};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Constructor {
    pub inputs: Vec<Param>,
    pub state_mutability: StateMutability,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Function {
    pub name: String,
    pub inputs: Vec<Param>,
    pub outputs: Vec<Param>,
    pub state_mutability: StateMutability,
}

impl Function {
    /// Canonical signature, e.g. `changeOwner(address)`.
    pub fn signature(&self) -> String {
        canonical_signature(&self.name, &self.inputs)
    }

    /// First four bytes of the Keccak-256 hash of the signature.
    pub fn selector(&self) -> [u8; 4] {
        selector(&self.signature())
    }

    pub fn selector_hex(&self) -> String {
        to_hex(&self.selector())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub name: String,
    pub inputs: Vec<Param>,
    pub anonymous: bool,
}

impl Event {
    pub fn signature(&self) -> String {
        canonical_signature(&self.name, &self.inputs)
    }

    /// Keccak-256 hash of the signature. Emitted as the first log topic
    /// unless the event is anonymous.
    pub fn topic(&self) -> [u8; 32] {
        keccak256(self.signature().as_bytes())
    }

    pub fn topic_hex(&self) -> String {
        to_hex(&self.topic())
    }

    pub fn indexed_inputs(&self) -> impl Iterator<Item = &Param> {
        self.inputs.iter().filter(|param| param.indexed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Entry {
    Constructor(Constructor),
    Event(Event),
    Function(Function),
}

/// A validated contract interface.
///
/// Built once by the loader and never mutated afterwards; share it by
/// reference. Entries keep the order they were declared in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Descriptor {
    pub(crate) entries: Vec<Entry>,
}

impl Descriptor {
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn constructor(&self) -> Option<&Constructor> {
        self.entries.iter().find_map(|entry| match entry {
            Entry::Constructor(constructor) => Some(constructor),
            _ => None,
        })
    }

    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::Function(function) => Some(function),
            _ => None,
        })
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::Event(event) => Some(event),
            _ => None,
        })
    }

    /// All overloads named `name`, in declaration order. Empty when there
    /// is no such function.
    pub fn find_function(&self, name: &str) -> Vec<&Function> {
        self.functions().filter(|function| function.name == name).collect()
    }

    pub fn find_event(&self, name: &str) -> Option<&Event> {
        self.events().find(|event| event.name == name)
    }

    /// Looks a function up by canonical signature. Whitespace is ignored but
    /// aliases are not expanded: pass `uint256`, not `uint`.
    pub fn function_by_signature(&self, signature: &str) -> Option<&Function> {
        let wanted: String = signature.chars().filter(|c| !c.is_whitespace()).collect();
        self.functions().find(|function| function.signature() == wanted)
    }

    pub fn function_by_selector(&self, selector: &[u8; 4]) -> Option<&Function> {
        self.functions().find(|function| &function.selector() == selector)
    }

    pub fn event_by_topic(&self, topic: &[u8; 32]) -> Option<&Event> {
        self.events()
            .find(|event| !event.anonymous && &event.topic() == topic)
    }
}
