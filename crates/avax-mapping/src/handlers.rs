//! Mapping handlers: copy a decoded block, call or event into an entity and
//! save it.
//!
//! Every handler builds a fresh entity, performs exactly one awaited save and
//! shares no state with other invocations. Saving the same input twice
//! relies on the store's overwrite-by-id semantics.

use eyre::Result;

use crate::args::{ApproveCallArgs, DecodedArgs, TransferEventArgs};
use crate::entities::{Approve, BlockEntity, Entity, EventEntity, Transaction, TransactionEntity};
use crate::error::MappingError;
use crate::logger::{HandlerLogger, NoopLogger};
use crate::store::EntityStore;
use crate::types::{AvalancheEvent, AvalancheTransaction};
use crate::wrapper::BlockWrapper;

/// Capabilities injected into every handler invocation.
#[derive(Clone, Copy)]
pub struct HandlerContext<'a> {
    store: &'a dyn EntityStore,
    logger: &'a dyn HandlerLogger,
}

impl<'a> HandlerContext<'a> {
    /// Context writing to `store` with logging disabled.
    pub fn new(store: &'a dyn EntityStore) -> Self {
        Self {
            store,
            logger: &NoopLogger,
        }
    }

    pub fn with_logger(self, logger: &'a dyn HandlerLogger) -> Self {
        Self { logger, ..self }
    }

    pub fn store(&self) -> &'a dyn EntityStore {
        self.store
    }

    pub fn logger(&self) -> &'a dyn HandlerLogger {
        self.logger
    }
}

async fn persist<E: Entity>(ctx: &HandlerContext<'_>, entity: &E) -> Result<()> {
    tracing::debug!(kind = ?E::KIND, id = entity.id(), "saving entity");
    entity.save(ctx.store).await
}

/// Id of a [`TransactionEntity`]: `{blockHash}-{txHash}`.
pub fn transaction_entity_id<A>(tx: &AvalancheTransaction<A>) -> String {
    format!("{}-{}", tx.block_hash, tx.hash)
}

/// Id of an [`EventEntity`]: `{blockHash}-{logIndex}`.
pub fn event_entity_id<A>(event: &AvalancheEvent<A>) -> String {
    format!("{}-{}", event.block_hash, event.log_index)
}

/// Stores the wrapped block as a [`BlockEntity`] keyed by its hash.
#[tracing::instrument(skip_all)]
pub async fn handle_block(ctx: &HandlerContext<'_>, wrapper: &dyn BlockWrapper) -> Result<()> {
    let block = wrapper.block();
    let record = BlockEntity {
        id: block.hash.clone(),
        difficulty: block.difficulty.clone(),
        extra_data: block.extra_data.clone(),
        gas_limit: block.gas_limit.clone(),
        gas_used: block.gas_used.clone(),
        hash: block.hash.clone(),
        logs_bloom: block.logs_bloom.clone(),
        miner: block.miner.clone(),
        mix_hash: block.mix_hash.clone(),
        nonce: block.nonce.clone(),
        number: block.number.clone(),
        parent_hash: block.parent_hash.clone(),
        receipts_root: block.receipts_root.clone(),
        sha3_uncles: block.sha3_uncles.clone(),
        size: block.size.clone(),
        state_root: block.state_root.clone(),
        timestamp: block.timestamp.clone(),
        total_difficulty: block.total_difficulty.clone(),
        transactions_root: block.transactions_root.clone(),
        uncles: block.uncles.clone(),
    };

    persist(ctx, &record).await
}

/// Stores a transaction as a [`TransactionEntity`] keyed by `{blockHash}-{hash}`.
#[tracing::instrument(skip_all, fields(tx_hash = %tx.hash))]
pub async fn handle_call<A: Sync>(
    ctx: &HandlerContext<'_>,
    tx: &AvalancheTransaction<A>,
) -> Result<()> {
    let record = TransactionEntity {
        id: transaction_entity_id(tx),
        block_id: tx.block_hash.clone(),
        block_hash: tx.block_hash.clone(),
        block_number: tx.block_number.clone(),
        from: tx.from.clone(),
        gas: tx.gas.clone(),
        gas_price: tx.gas_price.clone(),
        hash: tx.hash.clone(),
        input: tx.input.clone(),
        nonce: tx.nonce.clone(),
        r: tx.r.clone(),
        s: tx.s.clone(),
        to: tx.to.clone(),
        transaction_index: tx.transaction_index.clone(),
        v: tx.v.clone(),
        value: tx.value.clone(),
    };

    persist(ctx, &record).await
}

/// Stores a log entry as an [`EventEntity`] keyed by `{blockHash}-{logIndex}`.
#[tracing::instrument(skip_all, fields(tx_hash = %event.transaction_hash, log_index = %event.log_index))]
pub async fn handle_event<A: Sync>(
    ctx: &HandlerContext<'_>,
    event: &AvalancheEvent<A>,
) -> Result<()> {
    let record = EventEntity {
        id: event_entity_id(event),
        address: event.address.clone(),
        block_id: event.block_hash.clone(),
        block_hash: event.block_hash.clone(),
        block_number: event.block_number.clone(),
        data: event.data.clone(),
        log_index: event.log_index.clone(),
        topics: event.topics.clone(),
        transaction_hash: event.transaction_hash.clone(),
        transaction_index: event.transaction_index.clone(),
    };

    persist(ctx, &record).await
}

/// Projects a decoded `Transfer` event into a [`Transaction`] keyed by the
/// transaction hash.
///
/// # Errors
/// [`MappingError::EventArgsNotParsed`] if the event carries no decoded
/// arguments; nothing is saved in that case. Store errors pass through.
#[tracing::instrument(skip_all, fields(tx_hash = %event.transaction_hash))]
pub async fn handle_evm_event_transfer(
    ctx: &HandlerContext<'_>,
    event: &AvalancheEvent<TransferEventArgs>,
) -> Result<()> {
    let DecodedArgs::Parsed(args) = &event.args else {
        return Err(MappingError::EventArgsNotParsed.into());
    };

    let transaction = Transaction {
        id: event.transaction_hash.clone(),
        value: args.value,
        from: args.from.clone(),
        to: args.to.clone(),
        contract_address: event.address.clone(),
    };

    ctx.logger
        .info(&format!("Saved Transaction: {}", event.transaction_hash));
    persist(ctx, &transaction).await
}

/// Projects a decoded `approve` call into an [`Approve`] keyed by the
/// transaction hash.
///
/// # Errors
/// [`MappingError::CallArgsNotParsed`] if the call carries no decoded
/// arguments; nothing is saved in that case. Store errors pass through.
#[tracing::instrument(skip_all, fields(tx_hash = %tx.hash))]
pub async fn handle_evm_call_approve(
    ctx: &HandlerContext<'_>,
    tx: &AvalancheTransaction<ApproveCallArgs>,
) -> Result<()> {
    let DecodedArgs::Parsed(args) = &tx.args else {
        return Err(MappingError::CallArgsNotParsed.into());
    };

    let approve = Approve {
        id: tx.hash.clone(),
        from: tx.from.clone(),
        spender: args.spender.clone(),
        value: args.value,
        contract_address: tx.to.clone(),
    };

    persist(ctx, &approve).await
}
