//! Call data and event log encoding against descriptor entries.
//!
//! The wire format is handled by `ethers::abi`; this module checks values
//! against the declared parameter types and deals with selectors and topics.

use ethers::abi::{self, ParamType, Token};
use ethers::types::H256;

use crate::descriptor::{Constructor, Event, Function};
use crate::error::CodecError;
use crate::signature::to_hex;
use crate::types::Param;

fn param_types(params: &[Param]) -> Vec<ParamType> {
    params.iter().map(|param| param.kind.to_param_type()).collect()
}

fn check_tokens(params: &[Param], tokens: &[Token]) -> Result<(), CodecError> {
    if params.len() != tokens.len() {
        return Err(CodecError::ArityMismatch {
            expected: params.len(),
            found: tokens.len(),
        });
    }
    for (index, (param, token)) in params.iter().zip(tokens).enumerate() {
        if !token.type_check(&param.kind.to_param_type()) {
            return Err(CodecError::TypeMismatch {
                index,
                expected: param.kind.to_string(),
            });
        }
    }
    Ok(())
}

impl Function {
    /// Selector followed by the ABI-encoded arguments.
    pub fn encode_call(&self, args: &[Token]) -> Result<Vec<u8>, CodecError> {
        check_tokens(&self.inputs, args)?;

        let mut call_data = self.selector().to_vec();
        call_data.extend(abi::encode(args));
        Ok(call_data)
    }

    /// Decodes call data produced by [`Function::encode_call`], checking the
    /// selector first.
    pub fn decode_call(&self, call_data: &[u8]) -> Result<Vec<Token>, CodecError> {
        let selector = self.selector();
        if call_data.len() < 4 || call_data[..4] != selector {
            return Err(CodecError::SelectorMismatch {
                expected: to_hex(&selector),
                found: to_hex(&call_data[..call_data.len().min(4)]),
            });
        }
        Ok(abi::decode(&param_types(&self.inputs), &call_data[4..])?)
    }

    pub fn decode_output(&self, data: &[u8]) -> Result<Vec<Token>, CodecError> {
        Ok(abi::decode(&param_types(&self.outputs), data)?)
    }
}

impl Constructor {
    /// Deployment data: contract bytecode followed by the encoded arguments.
    pub fn encode_deploy(&self, bytecode: &[u8], args: &[Token]) -> Result<Vec<u8>, CodecError> {
        check_tokens(&self.inputs, args)?;

        let mut deploy_data = bytecode.to_vec();
        deploy_data.extend(abi::encode(args));
        Ok(deploy_data)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogValue {
    pub name: String,
    pub indexed: bool,
    pub value: Token,
}

/// Event parameters decoded from a log, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedLog {
    pub event: String,
    pub values: Vec<LogValue>,
}

impl DecodedLog {
    pub fn get(&self, name: &str) -> Option<&Token> {
        self.values
            .iter()
            .find(|value| value.name == name)
            .map(|value| &value.value)
    }
}

impl Event {
    /// Decodes a log emitted by this event.
    ///
    /// Indexed parameters of reference types (strings, bytes, arrays and
    /// tuples) come back as the 32-byte hash stored in their topic.
    pub fn decode_log(&self, topics: &[H256], data: &[u8]) -> Result<DecodedLog, CodecError> {
        let topic_mismatch = || CodecError::TopicMismatch {
            event: self.name.clone(),
        };

        let indexed_topics = if self.anonymous {
            topics
        } else {
            match topics.split_first() {
                Some((first, rest)) if first.as_bytes() == self.topic() => rest,
                _ => return Err(topic_mismatch()),
            }
        };
        if indexed_topics.len() != self.indexed_inputs().count() {
            return Err(topic_mismatch());
        }

        let data_params: Vec<Param> = self
            .inputs
            .iter()
            .filter(|param| !param.indexed)
            .cloned()
            .collect();
        let mut data_values = abi::decode(&param_types(&data_params), data)?.into_iter();
        let mut topic_values = indexed_topics.iter();

        let mut values = Vec::with_capacity(self.inputs.len());
        for param in &self.inputs {
            let value = if param.indexed {
                let topic = topic_values.next().ok_or_else(topic_mismatch)?;
                if param.kind.is_hashed_when_indexed() {
                    Token::FixedBytes(topic.as_bytes().to_vec())
                } else {
                    abi::decode(&[param.kind.to_param_type()], topic.as_bytes())?
                        .into_iter()
                        .next()
                        .ok_or_else(topic_mismatch)?
                }
            } else {
                data_values.next().ok_or_else(topic_mismatch)?
            };
            values.push(LogValue {
                name: param.name.clone(),
                indexed: param.indexed,
                value,
            });
        }

        Ok(DecodedLog {
            event: self.name.clone(),
            values,
        })
    }
}
