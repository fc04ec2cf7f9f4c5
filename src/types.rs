// type definitions
use std::fmt;
use std::str::FromStr;

use ethers::abi::ParamType;
use serde::{Serialize, Serializer};

/// A parsed parameter type tag.
///
/// `uint` and `int` are normalised to their 256-bit forms, so two tags that
/// name the same type compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AbiType {
    Uint(usize),
    Int(usize),
    Address,
    Bool,
    String,
    Bytes,
    FixedBytes(usize),
    Function,
    Array(Box<AbiType>),
    FixedArray(Box<AbiType>, usize),
    Tuple(Vec<AbiType>),
}

impl AbiType {
    /// Parses a declared type tag such as `uint256`, `address[]` or
    /// `tuple[2]`.
    ///
    /// `components` carries the member types of a tuple and is required
    /// whenever the base of the tag is `tuple`. Returns `None` when the tag
    /// is not a valid ABI type.
    pub fn parse(tag: &str, components: Option<&[AbiType]>) -> Option<AbiType> {
        let tag = tag.trim();
        if let Some(stripped) = tag.strip_suffix(']') {
            let open = stripped.rfind('[')?;
            let inner = Self::parse(&stripped[..open], components)?;
            let dim = &stripped[open + 1..];
            if dim.is_empty() {
                return Some(AbiType::Array(Box::new(inner)));
            }
            let len = parse_digits(dim)?;
            if len == 0 {
                return None;
            }
            return Some(AbiType::FixedArray(Box::new(inner), len));
        }
        Self::parse_base(tag, components)
    }

    fn parse_base(tag: &str, components: Option<&[AbiType]>) -> Option<AbiType> {
        match tag {
            "address" => Some(AbiType::Address),
            "bool" => Some(AbiType::Bool),
            "string" => Some(AbiType::String),
            "bytes" => Some(AbiType::Bytes),
            "function" => Some(AbiType::Function),
            "uint" => Some(AbiType::Uint(256)),
            "int" => Some(AbiType::Int(256)),
            "tuple" => components.map(|members| AbiType::Tuple(members.to_vec())),
            _ => {
                if let Some(bits) = tag.strip_prefix("uint") {
                    parse_bits(bits).map(AbiType::Uint)
                } else if let Some(bits) = tag.strip_prefix("int") {
                    parse_bits(bits).map(AbiType::Int)
                } else if let Some(len) = tag.strip_prefix("bytes") {
                    parse_digits(len)
                        .filter(|len| (1..=32).contains(len))
                        .map(AbiType::FixedBytes)
                } else {
                    None
                }
            }
        }
    }

    /// Whether an indexed event parameter of this type is stored in its
    /// topic as a Keccak-256 hash rather than as its value.
    pub fn is_hashed_when_indexed(&self) -> bool {
        matches!(
            self,
            AbiType::String
                | AbiType::Bytes
                | AbiType::Array(_)
                | AbiType::FixedArray(..)
                | AbiType::Tuple(_)
        )
    }

    pub fn to_param_type(&self) -> ParamType {
        match self {
            AbiType::Uint(bits) => ParamType::Uint(*bits),
            AbiType::Int(bits) => ParamType::Int(*bits),
            AbiType::Address => ParamType::Address,
            AbiType::Bool => ParamType::Bool,
            AbiType::String => ParamType::String,
            AbiType::Bytes => ParamType::Bytes,
            AbiType::FixedBytes(len) => ParamType::FixedBytes(*len),
            // address (20 bytes) followed by a selector (4 bytes)
            AbiType::Function => ParamType::FixedBytes(24),
            AbiType::Array(inner) => ParamType::Array(Box::new(inner.to_param_type())),
            AbiType::FixedArray(inner, len) => {
                ParamType::FixedArray(Box::new(inner.to_param_type()), *len)
            }
            AbiType::Tuple(members) => {
                ParamType::Tuple(members.iter().map(AbiType::to_param_type).collect())
            }
        }
    }
}

fn parse_digits(text: &str) -> Option<usize> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

fn parse_bits(text: &str) -> Option<usize> {
    parse_digits(text).filter(|bits| *bits >= 8 && *bits <= 256 && bits % 8 == 0)
}

impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiType::Uint(bits) => write!(f, "uint{}", bits),
            AbiType::Int(bits) => write!(f, "int{}", bits),
            AbiType::Address => f.write_str("address"),
            AbiType::Bool => f.write_str("bool"),
            AbiType::String => f.write_str("string"),
            AbiType::Bytes => f.write_str("bytes"),
            AbiType::FixedBytes(len) => write!(f, "bytes{}", len),
            AbiType::Function => f.write_str("function"),
            AbiType::Array(inner) => write!(f, "{}[]", inner),
            AbiType::FixedArray(inner, len) => write!(f, "{}[{}]", inner, len),
            AbiType::Tuple(members) => {
                f.write_str("(")?;
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", member)?;
                }
                f.write_str(")")
            }
        }
    }
}

impl Serialize for AbiType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    Pure,
    View,
    NonPayable,
    Payable,
}

impl StateMutability {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateMutability::Pure => "pure",
            StateMutability::View => "view",
            StateMutability::NonPayable => "nonpayable",
            StateMutability::Payable => "payable",
        }
    }

    /// `pure` and `view` functions never change contract state.
    pub fn is_read_only(&self) -> bool {
        matches!(self, StateMutability::Pure | StateMutability::View)
    }
}

impl FromStr for StateMutability {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pure" => Ok(StateMutability::Pure),
            "view" => Ok(StateMutability::View),
            "nonpayable" => Ok(StateMutability::NonPayable),
            "payable" => Ok(StateMutability::Payable),
            _ => Err(()),
        }
    }
}

impl fmt::Display for StateMutability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of an `inputs`, `outputs` or `components` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Param {
    pub name: String,
    /// The type tag exactly as declared, e.g. `uint` or `tuple[]`.
    #[serde(rename = "type")]
    pub type_tag: String,
    #[serde(skip)]
    pub kind: AbiType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_type: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub indexed: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Param>,
}

impl Param {
    /// Name for display purposes; unnamed parameters (common for return
    /// values) render as `unnamed`.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "unnamed"
        } else {
            &self.name
        }
    }
}
