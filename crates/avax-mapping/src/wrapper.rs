//! Read-only accessor over a decoded block.

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::filters::CallFilter;
use crate::types::{AvalancheBlock, AvalancheEvent, AvalancheTransaction};

/// What a handler can see of the block being indexed.
pub trait BlockWrapper: Send + Sync {
    fn block(&self) -> &AvalancheBlock;

    fn block_height(&self) -> Result<u64>;

    fn hash(&self) -> &str;

    /// Transactions matching `filter`, or `None` if this wrapper cannot
    /// serve calls.
    fn calls(&self, _filter: Option<&CallFilter>) -> Option<Vec<AvalancheTransaction>> {
        None
    }

    fn events(&self) -> &[AvalancheEvent];

    fn version(&self) -> u32;
}

/// Owned block plus its logs, usually deserialized from a replay file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecodedBlock {
    pub block: AvalancheBlock,
    #[serde(default)]
    pub events: Vec<AvalancheEvent>,
    #[serde(default = "default_version")]
    pub version: u32,
}

fn default_version() -> u32 {
    1
}

impl DecodedBlock {
    pub fn new(block: AvalancheBlock) -> Self {
        Self {
            block,
            events: Vec::new(),
            version: default_version(),
        }
    }

    pub fn with_events(mut self, events: Vec<AvalancheEvent>) -> Self {
        self.events = events;
        self
    }
}

impl BlockWrapper for DecodedBlock {
    fn block(&self) -> &AvalancheBlock {
        &self.block
    }

    fn block_height(&self) -> Result<u64> {
        parse_quantity(&self.block.number)
            .wrap_err_with(|| format!("invalid block number in block {}", self.block.hash))
    }

    fn hash(&self) -> &str {
        &self.block.hash
    }

    fn calls(&self, filter: Option<&CallFilter>) -> Option<Vec<AvalancheTransaction>> {
        Some(
            self.block
                .transactions
                .iter()
                .filter(|tx| filter.map_or(true, |f| f.matches(tx)))
                .cloned()
                .collect(),
        )
    }

    fn events(&self) -> &[AvalancheEvent] {
        &self.events
    }

    fn version(&self) -> u32 {
        self.version
    }
}

/// Parse a node quantity given either as `0x`-prefixed hex or decimal text.
pub fn parse_quantity(value: &str) -> Result<u64> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => value.parse::<u64>(),
    };
    parsed.wrap_err_with(|| format!("not a quantity: {value:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_quantity_cases() {
        assert_eq!(parse_quantity("0x1f4").unwrap(), 500);
        assert_eq!(parse_quantity("500").unwrap(), 500);
        assert_eq!(parse_quantity("0x0").unwrap(), 0);
        assert!(parse_quantity("").is_err());
        assert!(parse_quantity("0xzz").is_err());
    }

    #[test]
    fn decoded_block_defaults_from_json() {
        let json = r#"{
            "block": {
                "difficulty": "1", "extraData": "0x", "gasLimit": "8000000", "gasUsed": "0",
                "hash": "0xabc", "logsBloom": "0x", "miner": "0x01", "mixHash": "0x",
                "nonce": "0x0", "number": "0x10", "parentHash": "0xpar", "receiptsRoot": "0x",
                "sha3Uncles": "0x", "size": "512", "stateRoot": "0x", "timestamp": "1630000000",
                "totalDifficulty": "16", "transactionsRoot": "0x"
            }
        }"#;
        let wrapper: DecodedBlock = serde_json::from_str(json).expect("block should parse");
        assert_eq!(wrapper.hash(), "0xabc");
        assert_eq!(wrapper.block_height().unwrap(), 16);
        assert_eq!(wrapper.version(), 1);
        assert!(wrapper.events().is_empty());
        assert!(wrapper.block().uncles.is_empty());
        assert_eq!(wrapper.calls(None), Some(Vec::new()));
    }
}
