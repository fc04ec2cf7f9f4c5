use ethers::abi::Token;
use ethers::types::{Address, U256};

use crate::error::ArgError;
use crate::types::AbiType;

/// Parse a textual argument into a token for a parameter of type `kind`.
pub fn parse_arg(kind: &AbiType, input: &str) -> Result<Token, ArgError> {
    let input = input.trim();

    match kind {
        AbiType::Address => {
            let bytes = decode_hex(input).map_err(|_| ArgError::InvalidAddress(input.to_string()))?;
            if !input.starts_with("0x") || bytes.len() != 20 {
                return Err(ArgError::InvalidAddress(input.to_string()));
            }
            Ok(Token::Address(Address::from_slice(&bytes)))
        }

        AbiType::Uint(bits) => {
            let value = parse_unsigned(input)?;
            if value.bits() > *bits {
                return Err(out_of_range(input, kind));
            }
            Ok(Token::Uint(value))
        }

        AbiType::Int(bits) => {
            let (negative, digits) = match input.strip_prefix('-') {
                Some(rest) => (true, rest),
                None => (false, input),
            };
            if digits.is_empty() {
                return Err(ArgError::InvalidInteger(input.to_string()));
            }
            let magnitude = U256::from_dec_str(digits)
                .map_err(|_| ArgError::InvalidInteger(input.to_string()))?;

            // two's complement range: [-2^(bits-1), 2^(bits-1) - 1]
            let limit = U256::one() << (*bits - 1);
            if (negative && magnitude > limit) || (!negative && magnitude >= limit) {
                return Err(out_of_range(input, kind));
            }

            let raw = if negative {
                (!magnitude).overflowing_add(U256::one()).0
            } else {
                magnitude
            };
            Ok(Token::Int(raw))
        }

        AbiType::Bool => match input {
            "true" => Ok(Token::Bool(true)),
            "false" => Ok(Token::Bool(false)),
            _ => Err(ArgError::InvalidBool(input.to_string())),
        },

        AbiType::String => Ok(Token::String(input.to_string())),

        AbiType::Bytes => Ok(Token::Bytes(decode_hex(input)?)),

        AbiType::FixedBytes(len) => fixed_bytes(input, *len),

        AbiType::Function => fixed_bytes(input, 24),

        AbiType::Array(_) | AbiType::FixedArray(..) | AbiType::Tuple(_) => {
            Err(ArgError::Unsupported(kind.to_string()))
        }
    }
}

fn parse_unsigned(input: &str) -> Result<U256, ArgError> {
    let parsed = match input.strip_prefix("0x") {
        Some("") => None,
        Some(hex_digits) => U256::from_str_radix(hex_digits, 16).ok(),
        None if input.is_empty() => None,
        None => U256::from_dec_str(input).ok(),
    };
    parsed.ok_or_else(|| ArgError::InvalidInteger(input.to_string()))
}

fn fixed_bytes(input: &str, len: usize) -> Result<Token, ArgError> {
    let bytes = decode_hex(input)?;
    if bytes.len() != len {
        return Err(ArgError::WrongLength {
            expected: len,
            found: bytes.len(),
        });
    }
    Ok(Token::FixedBytes(bytes))
}

fn decode_hex(input: &str) -> Result<Vec<u8>, ArgError> {
    hex::decode(input.strip_prefix("0x").unwrap_or(input))
        .map_err(|_| ArgError::InvalidHex(input.to_string()))
}

fn out_of_range(input: &str, kind: &AbiType) -> ArgError {
    ArgError::OutOfRange {
        value: input.to_string(),
        kind: kind.to_string(),
    }
}
