//! Entity persistence: the [`EntityStore`] contract and its SQLite adapter.
//!
//! Every entity kind gets its own table keyed by `id`. Saves are
//! `INSERT OR REPLACE`, so writing the same id twice keeps the last write.
//! Sequences (uncles, topics) are stored as JSON text and `U256` values as
//! decimal text.

use alloy::primitives::U256;
use async_trait::async_trait;
use eyre::{Context, Result};
use rusqlite::{Connection, OptionalExtension};
use tokio::sync::Mutex;

use crate::entities::{
    Approve, BlockEntity, EntityKind, EventEntity, Transaction, TransactionEntity,
};

/// Key-value persistence for mapping entities.
///
/// Each save constructs or replaces the record with the entity's id and fails
/// if the backend is unreachable or rejects the record.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn save_block(&self, block: &BlockEntity) -> Result<()>;
    async fn save_transaction(&self, tx: &TransactionEntity) -> Result<()>;
    async fn save_event(&self, event: &EventEntity) -> Result<()>;
    async fn save_transfer(&self, transfer: &Transaction) -> Result<()>;
    async fn save_approve(&self, approve: &Approve) -> Result<()>;
}

/// SQLite-backed [`EntityStore`].
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Creates or opens a SQLite database with WAL mode enabled.
    ///
    /// # Errors
    /// Returns error if the database cannot be opened or migrations fail.
    pub fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path).wrap_err_with(|| format!("failed to open {path}"))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Number of stored entities of `kind`.
    pub async fn count(&self, kind: EntityKind) -> Result<u64> {
        let conn = self.conn.lock().await;
        let count: u64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", kind.table()),
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub async fn get_block(&self, id: &str) -> Result<Option<BlockEntity>> {
        let conn = self.conn.lock().await;
        let row = conn
            .query_row(
                "
                SELECT id, difficulty, extra_data, gas_limit, gas_used, hash, logs_bloom,
                       miner, mix_hash, nonce, number, parent_hash, receipts_root,
                       sha3_uncles, size, state_root, timestamp, total_difficulty,
                       transactions_root, uncles
                FROM avalanche_blocks WHERE id = ?
                ",
                [id],
                |row| {
                    Ok((
                        BlockEntity {
                            id: row.get(0)?,
                            difficulty: row.get(1)?,
                            extra_data: row.get(2)?,
                            gas_limit: row.get(3)?,
                            gas_used: row.get(4)?,
                            hash: row.get(5)?,
                            logs_bloom: row.get(6)?,
                            miner: row.get(7)?,
                            mix_hash: row.get(8)?,
                            nonce: row.get(9)?,
                            number: row.get(10)?,
                            parent_hash: row.get(11)?,
                            receipts_root: row.get(12)?,
                            sha3_uncles: row.get(13)?,
                            size: row.get(14)?,
                            state_root: row.get(15)?,
                            timestamp: row.get(16)?,
                            total_difficulty: row.get(17)?,
                            transactions_root: row.get(18)?,
                            uncles: Vec::new(),
                        },
                        row.get::<_, String>(19)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(mut block, uncles)| {
            block.uncles = serde_json::from_str(&uncles).wrap_err("malformed uncles column")?;
            Ok(block)
        })
        .transpose()
    }

    pub async fn get_transaction(&self, id: &str) -> Result<Option<TransactionEntity>> {
        let conn = self.conn.lock().await;
        let tx = conn
            .query_row(
                "
                SELECT id, block_id, block_hash, block_number, from_address, gas, gas_price,
                       hash, input, nonce, r, s, to_address, transaction_index, v, value
                FROM avalanche_transactions WHERE id = ?
                ",
                [id],
                |row| {
                    Ok(TransactionEntity {
                        id: row.get(0)?,
                        block_id: row.get(1)?,
                        block_hash: row.get(2)?,
                        block_number: row.get(3)?,
                        from: row.get(4)?,
                        gas: row.get(5)?,
                        gas_price: row.get(6)?,
                        hash: row.get(7)?,
                        input: row.get(8)?,
                        nonce: row.get(9)?,
                        r: row.get(10)?,
                        s: row.get(11)?,
                        to: row.get(12)?,
                        transaction_index: row.get(13)?,
                        v: row.get(14)?,
                        value: row.get(15)?,
                    })
                },
            )
            .optional()?;
        Ok(tx)
    }

    pub async fn get_event(&self, id: &str) -> Result<Option<EventEntity>> {
        let conn = self.conn.lock().await;
        let row = conn
            .query_row(
                "
                SELECT id, address, block_id, block_hash, block_number, data, log_index,
                       topics, transaction_hash, transaction_index
                FROM avalanche_events WHERE id = ?
                ",
                [id],
                |row| {
                    Ok((
                        EventEntity {
                            id: row.get(0)?,
                            address: row.get(1)?,
                            block_id: row.get(2)?,
                            block_hash: row.get(3)?,
                            block_number: row.get(4)?,
                            data: row.get(5)?,
                            log_index: row.get(6)?,
                            topics: Vec::new(),
                            transaction_hash: row.get(8)?,
                            transaction_index: row.get(9)?,
                        },
                        row.get::<_, String>(7)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(mut event, topics)| {
            event.topics = serde_json::from_str(&topics).wrap_err("malformed topics column")?;
            Ok(event)
        })
        .transpose()
    }

    pub async fn get_transfer(&self, id: &str) -> Result<Option<Transaction>> {
        let conn = self.conn.lock().await;
        let row = conn
            .query_row(
                "SELECT id, value, from_address, to_address, contract_address FROM transfers WHERE id = ?",
                [id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(id, value, from, to, contract_address)| {
            Ok(Transaction {
                id,
                value: parse_decimal(&value)?,
                from,
                to,
                contract_address,
            })
        })
        .transpose()
    }

    pub async fn get_approve(&self, id: &str) -> Result<Option<Approve>> {
        let conn = self.conn.lock().await;
        let row = conn
            .query_row(
                "SELECT id, from_address, spender, value, contract_address FROM approvals WHERE id = ?",
                [id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, Option<String>>(4)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(id, from, spender, value, contract_address)| {
            Ok(Approve {
                id,
                from,
                spender,
                value: parse_decimal(&value)?,
                contract_address,
            })
        })
        .transpose()
    }
}

fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS avalanche_blocks (
            id TEXT PRIMARY KEY,
            difficulty TEXT,
            extra_data TEXT,
            gas_limit TEXT,
            gas_used TEXT,
            hash TEXT,
            logs_bloom TEXT,
            miner TEXT,
            mix_hash TEXT,
            nonce TEXT,
            number TEXT,
            parent_hash TEXT,
            receipts_root TEXT,
            sha3_uncles TEXT,
            size TEXT,
            state_root TEXT,
            timestamp TEXT,
            total_difficulty TEXT,
            transactions_root TEXT,
            uncles TEXT
        );

        CREATE TABLE IF NOT EXISTS avalanche_transactions (
            id TEXT PRIMARY KEY,
            block_id TEXT,
            block_hash TEXT,
            block_number TEXT,
            from_address TEXT,
            gas TEXT,
            gas_price TEXT,
            hash TEXT,
            input TEXT,
            nonce TEXT,
            r TEXT,
            s TEXT,
            to_address TEXT,
            transaction_index TEXT,
            v TEXT,
            value TEXT
        );

        CREATE TABLE IF NOT EXISTS avalanche_events (
            id TEXT PRIMARY KEY,
            address TEXT,
            block_id TEXT,
            block_hash TEXT,
            block_number TEXT,
            data TEXT,
            log_index TEXT,
            topics TEXT,
            transaction_hash TEXT,
            transaction_index TEXT
        );

        CREATE TABLE IF NOT EXISTS transfers (
            id TEXT PRIMARY KEY,
            value TEXT,
            from_address TEXT,
            to_address TEXT,
            contract_address TEXT
        );

        CREATE TABLE IF NOT EXISTS approvals (
            id TEXT PRIMARY KEY,
            from_address TEXT,
            spender TEXT,
            value TEXT,
            contract_address TEXT
        );
        ",
    )?;
    Ok(())
}

fn parse_decimal(value: &str) -> Result<U256> {
    U256::from_str_radix(value, 10).wrap_err_with(|| format!("malformed stored value: {value}"))
}

#[async_trait]
impl EntityStore for Store {
    async fn save_block(&self, block: &BlockEntity) -> Result<()> {
        let uncles = serde_json::to_string(&block.uncles)?;
        self.conn.lock().await.execute(
            "
            INSERT OR REPLACE INTO avalanche_blocks (
                id, difficulty, extra_data, gas_limit, gas_used, hash, logs_bloom, miner,
                mix_hash, nonce, number, parent_hash, receipts_root, sha3_uncles, size,
                state_root, timestamp, total_difficulty, transactions_root, uncles
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
            rusqlite::params![
                block.id,
                block.difficulty,
                block.extra_data,
                block.gas_limit,
                block.gas_used,
                block.hash,
                block.logs_bloom,
                block.miner,
                block.mix_hash,
                block.nonce,
                block.number,
                block.parent_hash,
                block.receipts_root,
                block.sha3_uncles,
                block.size,
                block.state_root,
                block.timestamp,
                block.total_difficulty,
                block.transactions_root,
                uncles,
            ],
        )?;
        Ok(())
    }

    async fn save_transaction(&self, tx: &TransactionEntity) -> Result<()> {
        self.conn.lock().await.execute(
            "
            INSERT OR REPLACE INTO avalanche_transactions (
                id, block_id, block_hash, block_number, from_address, gas, gas_price, hash,
                input, nonce, r, s, to_address, transaction_index, v, value
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
            rusqlite::params![
                tx.id,
                tx.block_id,
                tx.block_hash,
                tx.block_number,
                tx.from,
                tx.gas,
                tx.gas_price,
                tx.hash,
                tx.input,
                tx.nonce,
                tx.r,
                tx.s,
                tx.to,
                tx.transaction_index,
                tx.v,
                tx.value,
            ],
        )?;
        Ok(())
    }

    async fn save_event(&self, event: &EventEntity) -> Result<()> {
        let topics = serde_json::to_string(&event.topics)?;
        self.conn.lock().await.execute(
            "
            INSERT OR REPLACE INTO avalanche_events (
                id, address, block_id, block_hash, block_number, data, log_index, topics,
                transaction_hash, transaction_index
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
            rusqlite::params![
                event.id,
                event.address,
                event.block_id,
                event.block_hash,
                event.block_number,
                event.data,
                event.log_index,
                topics,
                event.transaction_hash,
                event.transaction_index,
            ],
        )?;
        Ok(())
    }

    async fn save_transfer(&self, transfer: &Transaction) -> Result<()> {
        self.conn.lock().await.execute(
            "
            INSERT OR REPLACE INTO transfers (id, value, from_address, to_address, contract_address)
            VALUES (?, ?, ?, ?, ?)
            ",
            rusqlite::params![
                transfer.id,
                transfer.value.to_string(),
                transfer.from,
                transfer.to,
                transfer.contract_address,
            ],
        )?;
        Ok(())
    }

    async fn save_approve(&self, approve: &Approve) -> Result<()> {
        self.conn.lock().await.execute(
            "
            INSERT OR REPLACE INTO approvals (id, from_address, spender, value, contract_address)
            VALUES (?, ?, ?, ?, ?)
            ",
            rusqlite::params![
                approve.id,
                approve.from,
                approve.spender,
                approve.value.to_string(),
                approve.contract_address,
            ],
        )?;
        Ok(())
    }
}
