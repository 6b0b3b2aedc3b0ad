//! avax-mapping crate
//!
//! Mapping handlers that copy decoded Avalanche C-Chain blocks, calls and
//! logs into persisted entities.

pub mod abi;
pub mod args;
pub mod entities;
pub mod error;
pub mod filters;
pub mod handlers;
pub mod logger;
pub mod memory;
pub mod project;
pub mod store;
pub mod types;
pub mod wrapper;

pub use args::{ApproveCallArgs, DecodedArgs, TransferEventArgs};
pub use entities::{Approve, BlockEntity, Entity, EntityKind, EventEntity, Transaction, TransactionEntity};
pub use error::MappingError;
pub use handlers::{
    handle_block, handle_call, handle_event, handle_evm_call_approve, handle_evm_event_transfer,
    HandlerContext,
};
pub use logger::{HandlerLogger, NoopLogger, TracingLogger};
pub use project::{BlockSummary, Project};
pub use store::{EntityStore, Store};
pub use types::{AvalancheBlock, AvalancheEvent, AvalancheTransaction};
pub use wrapper::{BlockWrapper, DecodedBlock};
