//! Routes one wrapped block through every handler whose filter matches.

use eyre::Result;
use serde::Serialize;

use crate::abi::{self, APPROVE_SIGNATURE, TRANSFER_SIGNATURE};
use crate::args::{ApproveCallArgs, DecodedArgs, TransferEventArgs};
use crate::filters::{CallFilter, EventFilter};
use crate::handlers::{
    handle_block, handle_call, handle_event, handle_evm_call_approve, handle_evm_event_transfer,
    HandlerContext,
};
use crate::types::RawArgs;
use crate::wrapper::BlockWrapper;

/// Entities written while indexing one or more blocks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BlockSummary {
    pub blocks: u64,
    pub transactions: u64,
    pub events: u64,
    pub transfers: u64,
    pub approvals: u64,
}

impl BlockSummary {
    pub fn merge(&mut self, other: BlockSummary) {
        self.blocks += other.blocks;
        self.transactions += other.transactions;
        self.events += other.events;
        self.transfers += other.transfers;
        self.approvals += other.approvals;
    }
}

/// Handler set with the filters binding the domain handlers.
#[derive(Clone, Debug)]
pub struct Project {
    transfer_filter: EventFilter,
    approve_filter: CallFilter,
}

impl Project {
    /// Transfer handler on the ERC-20 `Transfer` topic and approve handler on
    /// the `approve` selector, for any contract.
    pub fn new() -> Result<Self> {
        Ok(Self {
            transfer_filter: EventFilter::for_signature(TRANSFER_SIGNATURE)?,
            approve_filter: CallFilter::for_signature(APPROVE_SIGNATURE)?,
        })
    }

    /// Restrict both domain handlers to one contract.
    pub fn with_contract(mut self, address: impl Into<String>) -> Self {
        let address = address.into();
        self.transfer_filter = self.transfer_filter.with_address(address.clone());
        self.approve_filter = self.approve_filter.with_to(address);
        self
    }

    pub fn transfer_filter(&self) -> &EventFilter {
        &self.transfer_filter
    }

    pub fn approve_filter(&self) -> &CallFilter {
        &self.approve_filter
    }

    /// Run every matching handler for `wrapper`, in order: block, calls,
    /// events, approve calls, transfer events.
    ///
    /// # Errors
    /// The first handler error aborts the block and is returned unchanged.
    #[tracing::instrument(skip_all, fields(block_hash = %wrapper.hash()))]
    pub async fn run_block(
        &self,
        ctx: &HandlerContext<'_>,
        wrapper: &dyn BlockWrapper,
    ) -> Result<BlockSummary> {
        let mut summary = BlockSummary::default();
        let block = wrapper.block();

        handle_block(ctx, wrapper).await?;
        summary.blocks += 1;

        for tx in &block.transactions {
            handle_call(ctx, tx).await?;
            summary.transactions += 1;
        }

        for event in wrapper.events() {
            handle_event(ctx, event).await?;
            summary.events += 1;
        }

        let approve_calls = wrapper
            .calls(Some(&self.approve_filter))
            .unwrap_or_else(|| {
                block
                    .transactions
                    .iter()
                    .filter(|tx| self.approve_filter.matches(tx))
                    .cloned()
                    .collect()
            });
        for tx in &approve_calls {
            let args = resolve_args(&tx.args, || abi::decode_approve(tx));
            handle_evm_call_approve(ctx, &tx.with_args::<ApproveCallArgs>(args)).await?;
            summary.approvals += 1;
        }

        for event in wrapper
            .events()
            .iter()
            .filter(|event| self.transfer_filter.matches(event))
        {
            let args = resolve_args(&event.args, || abi::decode_transfer(event));
            handle_evm_event_transfer(ctx, &event.with_args::<TransferEventArgs>(args)).await?;
            summary.transfers += 1;
        }

        tracing::debug!(
            transactions = summary.transactions,
            events = summary.events,
            transfers = summary.transfers,
            approvals = summary.approvals,
            "block indexed"
        );
        Ok(summary)
    }
}

/// Typed arguments from the wire if present and well-formed, otherwise from
/// the ABI decoder.
fn resolve_args<T: serde::de::DeserializeOwned>(
    wire: &DecodedArgs<RawArgs>,
    decode: impl FnOnce() -> Option<T>,
) -> DecodedArgs<T> {
    let from_wire = wire
        .parsed()
        .and_then(|raw| serde_json::from_value::<T>(raw.clone()).ok());
    DecodedArgs::from(from_wire.or_else(decode))
}
