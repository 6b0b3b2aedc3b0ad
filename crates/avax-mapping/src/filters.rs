//! Call and event filters that decide which inputs reach a handler.
//!
//! Signatures may be given with parameter names and `indexed` markers, e.g.
//! `Transfer(address indexed from, address indexed to, uint256 value)`; they
//! are normalized to the canonical form before hashing.

use alloy::primitives::{keccak256, B256};
use eyre::{eyre, Result};

use crate::types::{AvalancheEvent, AvalancheTransaction};

/// Canonical form of a function or event signature: `name(type,type)`.
pub fn normalize_signature(signature: &str) -> Result<String> {
    let open = signature
        .find('(')
        .ok_or_else(|| eyre!("signature has no parameter list: {signature}"))?;
    let close = signature
        .rfind(')')
        .filter(|close| *close > open)
        .ok_or_else(|| eyre!("signature has no closing parenthesis: {signature}"))?;

    let name = signature[..open].trim();
    let name = name.strip_prefix("function ").unwrap_or(name);
    let name = name.strip_prefix("event ").unwrap_or(name).trim();
    if name.is_empty() {
        return Err(eyre!("signature has no name: {signature}"));
    }

    let params = signature[open + 1..close]
        .split(',')
        .map(str::trim)
        .filter(|param| !param.is_empty())
        .map(|param| param.split_whitespace().next().unwrap_or(param))
        .collect::<Vec<_>>()
        .join(",");

    Ok(format!("{name}({params})"))
}

/// Topic0 of an event signature.
pub fn event_topic(signature: &str) -> Result<B256> {
    Ok(keccak256(normalize_signature(signature)?.as_bytes()))
}

/// 4-byte selector of a function signature.
pub fn function_selector(signature: &str) -> Result<[u8; 4]> {
    let hash = keccak256(normalize_signature(signature)?.as_bytes());
    Ok([hash[0], hash[1], hash[2], hash[3]])
}

fn same_address(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Matches logs by emitting address and positional topics.
///
/// `None` topic positions match anything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub address: Option<String>,
    pub topics: Vec<Option<B256>>,
}

impl EventFilter {
    /// Filter on topic0 of `signature`.
    pub fn for_signature(signature: &str) -> Result<Self> {
        Ok(Self {
            address: None,
            topics: vec![Some(event_topic(signature)?)],
        })
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn matches<A>(&self, event: &AvalancheEvent<A>) -> bool {
        if let Some(address) = &self.address {
            if !same_address(address, &event.address) {
                return false;
            }
        }

        self.topics.iter().enumerate().all(|(i, expected)| match expected {
            None => true,
            Some(expected) => event
                .topics
                .get(i)
                .and_then(|topic| topic.parse::<B256>().ok())
                .is_some_and(|topic| topic == *expected),
        })
    }
}

/// Matches transactions by sender, target and function selector.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallFilter {
    pub from: Option<String>,
    pub to: Option<String>,
    pub selector: Option<[u8; 4]>,
}

impl CallFilter {
    /// Filter on the selector of `signature`.
    pub fn for_signature(signature: &str) -> Result<Self> {
        Ok(Self {
            selector: Some(function_selector(signature)?),
            ..Self::default()
        })
    }

    pub fn with_to(mut self, address: impl Into<String>) -> Self {
        self.to = Some(address.into());
        self
    }

    pub fn with_from(mut self, address: impl Into<String>) -> Self {
        self.from = Some(address.into());
        self
    }

    pub fn matches<A>(&self, tx: &AvalancheTransaction<A>) -> bool {
        if let Some(from) = &self.from {
            if !same_address(from, &tx.from) {
                return false;
            }
        }
        if let Some(to) = &self.to {
            if !tx.to.as_deref().is_some_and(|target| same_address(to, target)) {
                return false;
            }
        }
        match self.selector {
            None => true,
            Some(selector) => input_selector(&tx.input) == Some(selector),
        }
    }
}

fn input_selector(input: &str) -> Option<[u8; 4]> {
    let hex = input.strip_prefix("0x").unwrap_or(input);
    let bytes = alloy::primitives::hex::decode(hex.get(..8)?).ok()?;
    bytes.try_into().ok()
}
