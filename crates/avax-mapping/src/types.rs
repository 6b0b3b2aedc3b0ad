//! Decoded Avalanche C-Chain wire types handed to the mapping handlers.
//!
//! Every numeric-looking field is kept as the decimal/hex string the node
//! returned so nothing is lost before it reaches an entity.

use serde::{Deserialize, Serialize};

use crate::args::DecodedArgs;

/// Untyped decoded arguments, as they arrive on the wire.
pub type RawArgs = serde_json::Value;

/// Full block as decoded by the indexing framework.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvalancheBlock {
    pub difficulty: String,
    pub extra_data: String,
    pub gas_limit: String,
    pub gas_used: String,
    /// Block hash (hex text), the identity of the block entity.
    pub hash: String,
    pub logs_bloom: String,
    pub miner: String,
    pub mix_hash: String,
    pub nonce: String,
    pub number: String,
    pub parent_hash: String,
    pub receipts_root: String,
    pub sha3_uncles: String,
    pub size: String,
    pub state_root: String,
    pub timestamp: String,
    pub total_difficulty: String,
    /// Transactions in block order.
    #[serde(default)]
    pub transactions: Vec<AvalancheTransaction>,
    pub transactions_root: String,
    #[serde(default)]
    pub uncles: Vec<String>,
}

/// Transaction (call) inside a block.
///
/// `A` is the type of the decoded call arguments. Raw transactions carry
/// [`RawArgs`]; handlers bound to a function signature take a typed `A`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvalancheTransaction<A = RawArgs> {
    pub block_hash: String,
    pub block_number: String,
    pub from: String,
    pub gas: String,
    pub gas_price: String,
    pub hash: String,
    /// Calldata (hex with 0x prefix).
    pub input: String,
    pub nonce: String,
    /// Recipient address, `None` for contract creation.
    pub to: Option<String>,
    pub transaction_index: String,
    pub value: String,
    pub v: String,
    pub r: String,
    pub s: String,
    #[serde(default = "DecodedArgs::default", skip_serializing_if = "DecodedArgs::is_unparsed")]
    pub args: DecodedArgs<A>,
}

impl<A> AvalancheTransaction<A> {
    /// Copy of this transaction carrying `args` instead of its current arguments.
    pub fn with_args<B>(&self, args: DecodedArgs<B>) -> AvalancheTransaction<B> {
        AvalancheTransaction {
            block_hash: self.block_hash.clone(),
            block_number: self.block_number.clone(),
            from: self.from.clone(),
            gas: self.gas.clone(),
            gas_price: self.gas_price.clone(),
            hash: self.hash.clone(),
            input: self.input.clone(),
            nonce: self.nonce.clone(),
            to: self.to.clone(),
            transaction_index: self.transaction_index.clone(),
            value: self.value.clone(),
            v: self.v.clone(),
            r: self.r.clone(),
            s: self.s.clone(),
            args,
        }
    }
}

/// Log entry emitted while executing a transaction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvalancheEvent<A = RawArgs> {
    pub log_index: String,
    pub block_number: String,
    pub block_hash: String,
    pub transaction_hash: String,
    pub transaction_index: String,
    /// Address of the emitting contract.
    pub address: String,
    /// Non-indexed log data (hex with 0x prefix).
    pub data: String,
    /// Indexed topics in order, topic0 first.
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default = "DecodedArgs::default", skip_serializing_if = "DecodedArgs::is_unparsed")]
    pub args: DecodedArgs<A>,
}

impl<A> AvalancheEvent<A> {
    /// Copy of this event carrying `args` instead of its current arguments.
    pub fn with_args<B>(&self, args: DecodedArgs<B>) -> AvalancheEvent<B> {
        AvalancheEvent {
            log_index: self.log_index.clone(),
            block_number: self.block_number.clone(),
            block_hash: self.block_hash.clone(),
            transaction_hash: self.transaction_hash.clone(),
            transaction_index: self.transaction_index.clone(),
            address: self.address.clone(),
            data: self.data.clone(),
            topics: self.topics.clone(),
            args,
        }
    }
}
