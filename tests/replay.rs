//! End-to-end replays of decoded blocks through the handler set into SQLite.

mod common;

use alloy::primitives::U256;
use avax_mapping::{
    BlockSummary, BlockWrapper, DecodedArgs, EntityKind, HandlerContext, MappingError, Project,
};
use common::{active_block, block_hash, test_store, transfer_event, ALICE, BOB, USDC, WAVAX};

#[tokio::test]
async fn active_block_writes_every_entity_kind() {
    let store = test_store();
    let ctx = HandlerContext::new(&store);
    let wrapper = active_block(5_000_000);

    let summary = Project::new()
        .unwrap()
        .run_block(&ctx, &wrapper)
        .await
        .expect("block should index");

    assert_eq!(
        summary,
        BlockSummary {
            blocks: 1,
            transactions: 2,
            events: 2,
            transfers: 1,
            approvals: 1,
        }
    );
    assert_eq!(store.count(EntityKind::Block).await.unwrap(), 1);
    assert_eq!(store.count(EntityKind::Transaction).await.unwrap(), 2);
    assert_eq!(store.count(EntityKind::Event).await.unwrap(), 2);
    assert_eq!(store.count(EntityKind::Transfer).await.unwrap(), 1);
    assert_eq!(store.count(EntityKind::Approve).await.unwrap(), 1);
}

#[tokio::test]
async fn domain_entities_carry_decoded_arguments() {
    let store = test_store();
    let ctx = HandlerContext::new(&store);
    let wrapper = active_block(5_000_001);
    let approve_tx = &wrapper.block().transactions[0];
    let plain_tx = &wrapper.block().transactions[1];

    Project::new().unwrap().run_block(&ctx, &wrapper).await.unwrap();

    let approve = store
        .get_approve(&approve_tx.hash)
        .await
        .unwrap()
        .expect("approve keyed by tx hash");
    assert_eq!(approve.from, ALICE.to_checksum(None));
    assert_eq!(approve.spender, BOB.to_checksum(None));
    assert_eq!(approve.value, U256::from(500));
    assert_eq!(approve.contract_address.as_deref(), Some(USDC));

    let transfer = store
        .get_transfer(&plain_tx.hash)
        .await
        .unwrap()
        .expect("transfer keyed by tx hash");
    assert_eq!(transfer.from, ALICE.to_checksum(None));
    assert_eq!(transfer.to, BOB.to_checksum(None));
    assert_eq!(transfer.value, U256::from(1_000));
    assert_eq!(transfer.contract_address, WAVAX);
}

#[tokio::test]
async fn raw_entities_reference_their_block() {
    let store = test_store();
    let ctx = HandlerContext::new(&store);
    let wrapper = active_block(5_000_002);
    let hash = block_hash(5_000_002);

    Project::new().unwrap().run_block(&ctx, &wrapper).await.unwrap();

    let block = store.get_block(&hash).await.unwrap().expect("block keyed by hash");
    assert_eq!(block.number, wrapper.block().number);

    let tx = &wrapper.block().transactions[1];
    let stored_tx = store
        .get_transaction(&format!("{}-{}", hash, tx.hash))
        .await
        .unwrap()
        .expect("tx keyed by block-tx hash");
    assert_eq!(stored_tx.block_id, hash);
    assert_eq!(stored_tx.input, "0xd0e30db0");

    let event = store
        .get_event(&format!("{}-0x1", hash))
        .await
        .unwrap()
        .expect("event keyed by block-log index");
    assert_eq!(event.block_id, hash);
    assert_eq!(event.topics, wrapper.events()[1].topics);
}

#[tokio::test]
async fn replaying_twice_is_idempotent() {
    let store = test_store();
    let ctx = HandlerContext::new(&store);
    let wrapper = active_block(5_000_003);
    let project = Project::new().unwrap();

    project.run_block(&ctx, &wrapper).await.unwrap();
    project.run_block(&ctx, &wrapper).await.unwrap();

    for (kind, expected) in [
        (EntityKind::Block, 1),
        (EntityKind::Transaction, 2),
        (EntityKind::Event, 2),
        (EntityKind::Transfer, 1),
        (EntityKind::Approve, 1),
    ] {
        assert_eq!(store.count(kind).await.unwrap(), expected, "{kind:?}");
    }
}

#[tokio::test]
async fn contract_filter_skips_other_tokens() {
    let store = test_store();
    let ctx = HandlerContext::new(&store);
    let wrapper = active_block(5_000_004);

    let summary = Project::new()
        .unwrap()
        .with_contract(USDC.to_lowercase())
        .run_block(&ctx, &wrapper)
        .await
        .unwrap();

    // approve targets USDC, the transfer is emitted by WAVAX
    assert_eq!(summary.approvals, 1);
    assert_eq!(summary.transfers, 0);
    assert_eq!(summary.events, 2);
    assert_eq!(store.count(EntityKind::Transfer).await.unwrap(), 0);
}

#[tokio::test]
async fn wire_args_take_precedence_over_decoding() {
    let store = test_store();
    let ctx = HandlerContext::new(&store);
    let mut wrapper = active_block(5_000_005);
    wrapper.events[0].args = DecodedArgs::Parsed(serde_json::json!({
        "from": "0xAAA",
        "to": "0xBBB",
        "value": "0x3e8",
    }));

    Project::new().unwrap().run_block(&ctx, &wrapper).await.unwrap();

    let transfer = store
        .get_transfer(&wrapper.events[0].transaction_hash)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(transfer.from, "0xAAA");
    assert_eq!(transfer.to, "0xBBB");
    assert_eq!(transfer.value, U256::from(1000));
}

#[tokio::test]
async fn undecodable_transfer_aborts_block() {
    let store = test_store();
    let ctx = HandlerContext::new(&store);
    let mut wrapper = active_block(5_000_006);
    let tx = wrapper.block.transactions[1].clone();

    // ERC-721 Transfer: same topic0, token id indexed, empty data
    let mut nft = transfer_event(&tx, 2, WAVAX, ALICE, BOB, 0);
    nft.topics.push(format!("0x{:064x}", 7));
    nft.data = "0x".to_string();
    wrapper.events.push(nft);

    let err = Project::new()
        .unwrap()
        .run_block(&ctx, &wrapper)
        .await
        .expect_err("unparsed transfer args must fail");

    assert_eq!(
        err.downcast_ref::<MappingError>(),
        Some(&MappingError::EventArgsNotParsed)
    );
}

#[tokio::test]
async fn file_backed_replay_survives_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("avax.sqlite");
    let path = path.to_str().expect("utf-8 path");

    {
        let store = avax_mapping::Store::new(path).expect("store should open");
        let ctx = HandlerContext::new(&store);
        let project = Project::new().unwrap();
        for number in 100..103 {
            project.run_block(&ctx, &active_block(number)).await.unwrap();
        }
    }

    let store = avax_mapping::Store::new(path).expect("store should reopen");
    assert_eq!(store.count(EntityKind::Block).await.unwrap(), 3);
    assert_eq!(store.count(EntityKind::Transaction).await.unwrap(), 6);
    assert_eq!(store.count(EntityKind::Transfer).await.unwrap(), 3);
}
