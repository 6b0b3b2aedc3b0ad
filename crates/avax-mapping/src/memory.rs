//! In-memory [`EntityStore`] for tests and dry runs.

use async_trait::async_trait;
use dashmap::DashMap;
use eyre::Result;

use crate::entities::{
    Approve, BlockEntity, EntityKind, EventEntity, Transaction, TransactionEntity,
};
use crate::store::EntityStore;

/// Concurrent map per entity kind, overwrite-by-id.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blocks: DashMap<String, BlockEntity>,
    transactions: DashMap<String, TransactionEntity>,
    events: DashMap<String, EventEntity>,
    transfers: DashMap<String, Transaction>,
    approvals: DashMap<String, Approve>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Block => self.blocks.len(),
            EntityKind::Transaction => self.transactions.len(),
            EntityKind::Event => self.events.len(),
            EntityKind::Transfer => self.transfers.len(),
            EntityKind::Approve => self.approvals.len(),
        }
    }

    /// Total number of entities across all kinds.
    pub fn len(&self) -> usize {
        EntityKind::ALL.into_iter().map(|kind| self.count(kind)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn block(&self, id: &str) -> Option<BlockEntity> {
        self.blocks.get(id).map(|entry| entry.clone())
    }

    pub fn transaction(&self, id: &str) -> Option<TransactionEntity> {
        self.transactions.get(id).map(|entry| entry.clone())
    }

    pub fn event(&self, id: &str) -> Option<EventEntity> {
        self.events.get(id).map(|entry| entry.clone())
    }

    pub fn transfer(&self, id: &str) -> Option<Transaction> {
        self.transfers.get(id).map(|entry| entry.clone())
    }

    pub fn approve(&self, id: &str) -> Option<Approve> {
        self.approvals.get(id).map(|entry| entry.clone())
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn save_block(&self, block: &BlockEntity) -> Result<()> {
        self.blocks.insert(block.id.clone(), block.clone());
        Ok(())
    }

    async fn save_transaction(&self, tx: &TransactionEntity) -> Result<()> {
        self.transactions.insert(tx.id.clone(), tx.clone());
        Ok(())
    }

    async fn save_event(&self, event: &EventEntity) -> Result<()> {
        self.events.insert(event.id.clone(), event.clone());
        Ok(())
    }

    async fn save_transfer(&self, transfer: &Transaction) -> Result<()> {
        self.transfers.insert(transfer.id.clone(), transfer.clone());
        Ok(())
    }

    async fn save_approve(&self, approve: &Approve) -> Result<()> {
        self.approvals.insert(approve.id.clone(), approve.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn overwrite_keeps_one_entry_per_id() {
        let store = MemoryStore::new();
        let mut tx = TransactionEntity {
            id: "0xb-0xh".to_string(),
            value: "1".to_string(),
            ..Default::default()
        };
        store.save_transaction(&tx).await.unwrap();
        tx.value = "2".to_string();
        store.save_transaction(&tx).await.unwrap();

        assert_eq!(store.count(EntityKind::Transaction), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.transaction("0xb-0xh").unwrap().value, "2");
    }

    #[test]
    fn new_store_is_empty() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        assert!(store.block("0xnone").is_none());
    }
}
