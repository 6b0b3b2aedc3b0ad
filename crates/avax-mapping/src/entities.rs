//! Persisted entities written by the mapping handlers.
//!
//! Entities are flat records keyed by a string id. Back-references such as
//! [`TransactionEntity::block_id`] are plain lookup strings; the store owns
//! every record.

use alloy::primitives::U256;
use async_trait::async_trait;
use eyre::Result;
use serde::{Deserialize, Serialize};

use crate::store::EntityStore;

/// A record with a unique string id that an [`EntityStore`] can persist.
#[async_trait]
pub trait Entity: Send + Sync {
    /// Kind of entity, also the storage table name.
    const KIND: EntityKind;

    fn id(&self) -> &str;

    /// Construct-or-replace this record in `store`.
    async fn save(&self, store: &dyn EntityStore) -> Result<()>;
}

/// Every entity kind known to the stores.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Block,
    Transaction,
    Event,
    Transfer,
    Approve,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Block,
        EntityKind::Transaction,
        EntityKind::Event,
        EntityKind::Transfer,
        EntityKind::Approve,
    ];

    pub fn table(self) -> &'static str {
        match self {
            EntityKind::Block => "avalanche_blocks",
            EntityKind::Transaction => "avalanche_transactions",
            EntityKind::Event => "avalanche_events",
            EntityKind::Transfer => "transfers",
            EntityKind::Approve => "approvals",
        }
    }
}

impl std::str::FromStr for EntityKind {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "block" => Ok(EntityKind::Block),
            "transaction" => Ok(EntityKind::Transaction),
            "event" => Ok(EntityKind::Event),
            "transfer" => Ok(EntityKind::Transfer),
            "approve" => Ok(EntityKind::Approve),
            other => Err(eyre::eyre!("unknown entity kind: {other}")),
        }
    }
}

/// Block header fields, keyed by block hash.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockEntity {
    pub id: String,
    pub difficulty: String,
    pub extra_data: String,
    pub gas_limit: String,
    pub gas_used: String,
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
    pub transactions_root: String,
    pub uncles: Vec<String>,
}

/// Raw transaction, keyed by `{blockHash}-{txHash}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEntity {
    pub id: String,
    /// Id of the owning [`BlockEntity`].
    pub block_id: String,
    pub block_hash: String,
    pub block_number: String,
    pub from: String,
    pub gas: String,
    pub gas_price: String,
    pub hash: String,
    pub input: String,
    pub nonce: String,
    pub r: String,
    pub s: String,
    pub to: Option<String>,
    pub transaction_index: String,
    pub v: String,
    pub value: String,
}

/// Raw log entry, keyed by `{blockHash}-{logIndex}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEntity {
    pub id: String,
    pub address: String,
    /// Id of the owning [`BlockEntity`].
    pub block_id: String,
    pub block_hash: String,
    pub block_number: String,
    pub data: String,
    pub log_index: String,
    pub topics: Vec<String>,
    pub transaction_hash: String,
    pub transaction_index: String,
}

/// Token transfer projected from a `Transfer` event, keyed by transaction hash.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub value: U256,
    pub from: String,
    pub to: String,
    pub contract_address: String,
}

/// Allowance granted by an `approve` call, keyed by transaction hash.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Approve {
    pub id: String,
    pub from: String,
    pub spender: String,
    pub value: U256,
    pub contract_address: Option<String>,
}

#[async_trait]
impl Entity for BlockEntity {
    const KIND: EntityKind = EntityKind::Block;

    fn id(&self) -> &str {
        &self.id
    }

    async fn save(&self, store: &dyn EntityStore) -> Result<()> {
        store.save_block(self).await
    }
}

#[async_trait]
impl Entity for TransactionEntity {
    const KIND: EntityKind = EntityKind::Transaction;

    fn id(&self) -> &str {
        &self.id
    }

    async fn save(&self, store: &dyn EntityStore) -> Result<()> {
        store.save_transaction(self).await
    }
}

#[async_trait]
impl Entity for EventEntity {
    const KIND: EntityKind = EntityKind::Event;

    fn id(&self) -> &str {
        &self.id
    }

    async fn save(&self, store: &dyn EntityStore) -> Result<()> {
        store.save_event(self).await
    }
}

#[async_trait]
impl Entity for Transaction {
    const KIND: EntityKind = EntityKind::Transfer;

    fn id(&self) -> &str {
        &self.id
    }

    async fn save(&self, store: &dyn EntityStore) -> Result<()> {
        store.save_transfer(self).await
    }
}

#[async_trait]
impl Entity for Approve {
    const KIND: EntityKind = EntityKind::Approve;

    fn id(&self) -> &str {
        &self.id
    }

    async fn save(&self, store: &dyn EntityStore) -> Result<()> {
        store.save_approve(self).await
    }
}
