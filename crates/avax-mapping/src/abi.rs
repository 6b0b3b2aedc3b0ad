//! ERC-20 ABI the domain handlers are bound to, and decoders that attach
//! typed arguments to raw calls and logs.
//!
//! Decoded addresses are rendered as EIP-55 checksummed strings.

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::sol;
use alloy::sol_types::{SolCall, SolEvent};

use crate::args::{ApproveCallArgs, TransferEventArgs};
use crate::types::{AvalancheEvent, AvalancheTransaction};

sol! {
    interface IERC20 {
        event Transfer(address indexed from, address indexed to, uint256 value);

        function approve(address spender, uint256 value) external returns (bool);
    }
}

/// Event signature the transfer handler is bound to.
pub const TRANSFER_SIGNATURE: &str = "Transfer(address indexed from, address indexed to, uint256 value)";

/// Function signature the approve handler is bound to.
pub const APPROVE_SIGNATURE: &str = "approve(address spender, uint256 value)";

/// Decode `Transfer(address,address,uint256)` from a raw log.
///
/// Returns `None` unless topic0 is the Transfer hash, both participants are
/// indexed (three topics) and data holds one 32-byte word. ERC-721 transfers
/// share topic0 but index the token id, so they are rejected here.
pub fn decode_transfer<A>(event: &AvalancheEvent<A>) -> Option<TransferEventArgs> {
    let [topic0, topic1, topic2] = event.topics.as_slice() else {
        return None;
    };
    if topic0.parse::<B256>().ok()? != IERC20::Transfer::SIGNATURE_HASH {
        return None;
    }

    let from = address_from_topic(topic1)?;
    let to = address_from_topic(topic2)?;
    let data = event.data.parse::<Bytes>().ok()?;
    if data.len() != 32 {
        return None;
    }

    Some(TransferEventArgs {
        from: from.to_checksum(None),
        to: to.to_checksum(None),
        value: U256::from_be_slice(&data),
    })
}

/// Decode `approve(address,uint256)` from a transaction's calldata.
pub fn decode_approve<A>(tx: &AvalancheTransaction<A>) -> Option<ApproveCallArgs> {
    let input = tx.input.parse::<Bytes>().ok()?;
    let call = IERC20::approveCall::abi_decode(&input, true).ok()?;

    Some(ApproveCallArgs {
        spender: call.spender.to_checksum(None),
        value: call.value,
    })
}

/// Addresses are right-aligned in 32-byte topics: bytes 12..32 hold the address.
fn address_from_topic(topic_hex: &str) -> Option<Address> {
    let topic = topic_hex.parse::<B256>().ok()?;
    Some(Address::from_slice(&topic[12..]))
}
