//! Shared test helpers and utilities.
//!
//! Factory functions for decoded blocks, calls and logs with sensible
//! defaults, encoded the way a C-Chain node would return them.

#![allow(dead_code)]

use alloy::primitives::{address, hex, Address, B256, U256};
use alloy::sol_types::{SolCall, SolEvent};
use avax_mapping::abi::IERC20;
use avax_mapping::store::Store;
use avax_mapping::types::{AvalancheBlock, AvalancheEvent, AvalancheTransaction};
use avax_mapping::{DecodedArgs, DecodedBlock};

/// Wrapped AVAX on the C-Chain.
pub const WAVAX: &str = "0xB31f66AA3C1e785363F0875A1B74E27b85FD66c7";
/// USDC on the C-Chain.
pub const USDC: &str = "0xB97EF9Ef8734C71904D8002F8b6Bc66Dd9c48a6E";

pub const ALICE: Address = address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266");
pub const BOB: Address = address!("70997970c51812e339d9b73b0245ad59e15ebbf9");

/// Creates an in-memory SQLite Store with all migrations applied.
///
/// # Panics
/// Panics if the in-memory database cannot be created (should never happen).
pub fn test_store() -> Store {
    Store::new(":memory:").expect("in-memory store should always open")
}

/// Block hash derived from the block number, 0x-prefixed.
pub fn block_hash(number: u64) -> String {
    format!("0x{:064x}", number)
}

/// Creates a sample block with no transactions.
///
/// # Example
/// ```ignore
/// let block = sample_block(5_000_000);
/// assert_eq!(block.number, "0x4c4b40");
/// ```
pub fn sample_block(number: u64) -> AvalancheBlock {
    AvalancheBlock {
        difficulty: "0x1".to_string(),
        extra_data: "0x".to_string(),
        gas_limit: "0x7a1200".to_string(),
        gas_used: "0x0".to_string(),
        hash: block_hash(number),
        logs_bloom: format!("0x{}", "0".repeat(512)),
        miner: "0x0100000000000000000000000000000000000000".to_string(),
        mix_hash: format!("0x{}", "0".repeat(64)),
        nonce: "0x0000000000000000".to_string(),
        number: format!("0x{:x}", number),
        parent_hash: block_hash(number.saturating_sub(1)),
        receipts_root: format!("0x{}", "1".repeat(64)),
        sha3_uncles: "0x1dcc4de8dec75d7aab85b567b6ccd41ad312451b948a7413f0a142fd40d49347"
            .to_string(),
        size: "0x2c6".to_string(),
        state_root: format!("0x{}", "2".repeat(64)),
        timestamp: format!("0x{:x}", 1_630_000_000 + number * 2),
        total_difficulty: format!("0x{:x}", number),
        transactions: Vec::new(),
        transactions_root: format!("0x{}", "3".repeat(64)),
        uncles: Vec::new(),
    }
}

/// Creates a sample transaction in `block` calling `to` with `input`.
pub fn sample_tx(block: u64, index: u64, to: &str, input: String) -> AvalancheTransaction {
    AvalancheTransaction {
        block_hash: block_hash(block),
        block_number: format!("0x{:x}", block),
        from: ALICE.to_checksum(None),
        gas: "0xea60".to_string(),
        gas_price: "0x5d21dba00".to_string(), // 25 gwei
        hash: format!("0x{:062x}{:02x}", block, index),
        input,
        nonce: format!("0x{:x}", index),
        to: Some(to.to_string()),
        transaction_index: format!("0x{:x}", index),
        value: "0x0".to_string(),
        v: "0x1".to_string(),
        r: format!("0x{}", "a".repeat(64)),
        s: format!("0x{}", "b".repeat(64)),
        args: DecodedArgs::Unparsed,
    }
}

/// Calldata for `approve(spender, value)`.
pub fn approve_input(spender: Address, value: u64) -> String {
    hex::encode_prefixed(
        IERC20::approveCall {
            spender,
            value: U256::from(value),
        }
        .abi_encode(),
    )
}

/// Creates an ERC-20 `Transfer` log emitted by `token` inside `tx`.
pub fn transfer_event(
    tx: &AvalancheTransaction,
    log_index: u64,
    token: &str,
    from: Address,
    to: Address,
    value: u64,
) -> AvalancheEvent {
    AvalancheEvent {
        log_index: format!("0x{:x}", log_index),
        block_number: tx.block_number.clone(),
        block_hash: tx.block_hash.clone(),
        transaction_hash: tx.hash.clone(),
        transaction_index: tx.transaction_index.clone(),
        address: token.to_string(),
        data: hex::encode_prefixed(U256::from(value).to_be_bytes::<32>()),
        topics: vec![
            hex::encode_prefixed(IERC20::Transfer::SIGNATURE_HASH),
            hex::encode_prefixed(from.into_word()),
            hex::encode_prefixed(to.into_word()),
        ],
        args: DecodedArgs::Unparsed,
    }
}

/// Creates a log that no domain handler listens to.
pub fn unrelated_event(tx: &AvalancheTransaction, log_index: u64) -> AvalancheEvent {
    AvalancheEvent {
        log_index: format!("0x{:x}", log_index),
        block_number: tx.block_number.clone(),
        block_hash: tx.block_hash.clone(),
        transaction_hash: tx.hash.clone(),
        transaction_index: tx.transaction_index.clone(),
        address: WAVAX.to_string(),
        data: "0x".to_string(),
        topics: vec![hex::encode_prefixed(B256::with_last_byte(0x42))],
        args: DecodedArgs::Unparsed,
    }
}

/// A block with one approve call, one plain call, one ERC-20 transfer and
/// one unrelated log.
pub fn active_block(number: u64) -> DecodedBlock {
    let mut block = sample_block(number);
    let approve = sample_tx(number, 0, USDC, approve_input(BOB, 500));
    let plain = sample_tx(number, 1, WAVAX, "0xd0e30db0".to_string()); // deposit()

    let events = vec![
        transfer_event(&plain, 0, WAVAX, ALICE, BOB, 1_000),
        unrelated_event(&plain, 1),
    ];
    block.transactions = vec![approve, plain];

    DecodedBlock::new(block).with_events(events)
}
