//! Integration tests for the accessor's success paths: full node payloads
//! (blocks, transactions, receipts, code) decoded end-to-end through the
//! mock node.

mod common;

use common::{start_mock_node, MockReply};
use ethview::NodeAccessor;
use serde_json::{json, Value};

use alloy::consensus::TxReceipt;
use alloy::eips::BlockId;
use alloy::primitives::{Address, B256, U256};

const BLOCK_HASH: &str = "0x9b83c12c69edb74f6c8dd5d052475c3e1eab3e8ee1f4ea46fc3c8a0f80a0b1c4";
const TX_HASH: &str = "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b";

fn zero_bloom() -> String {
    format!("0x{}", "00".repeat(256))
}

/// A mined legacy transaction as a node would return it; `mined: false`
/// strips the inclusion fields, matching a pending-pool response.
fn tx_json(mined: bool) -> Value {
    let mut tx = json!({
        "hash": TX_HASH,
        "nonce": "0x0",
        "blockHash": BLOCK_HASH,
        "blockNumber": "0x7",
        "transactionIndex": "0x0",
        "from": "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266",
        "to": "0x70997970c51812dc3a010c7d01b50e0d17dc79c8",
        "value": "0xde0b6b3a7640000",
        "gas": "0x5208",
        "gasPrice": "0x3b9aca00",
        "input": "0x",
        "chainId": "0x7a69",
        "v": "0xf4f6",
        "r": "0x1b5e176d927f8e9ab405058b2d2457392da3e20f328b16ddabcebc33eaac5fea",
        "s": "0x4ba69724e8f69de52f0125ad8b3c5c2cef33019bac3249e2c0a2192766d1721c",
        "type": "0x0"
    });
    if !mined {
        tx["blockHash"] = Value::Null;
        tx["blockNumber"] = Value::Null;
        tx["transactionIndex"] = Value::Null;
    }
    tx
}

fn block_json() -> Value {
    json!({
        "hash": BLOCK_HASH,
        "parentHash": "0x41c2cd6d26ae5b27650eddb3bec13564e2a9ec92075f3e74b12d346081559f94",
        "sha3Uncles": "0x1dcc4de8dec75d7aab85b567b6ccd41ad312451b948a7413f0a142fd40d49347",
        "miner": "0x0000000000000000000000000000000000000000",
        "stateRoot": "0x63b5f3c2fc581a05a2e33a1a7dc3d60ba5ae4b7b3b5d8a6b193cd09bfa5b0b25",
        "transactionsRoot": "0x5e4de1a9e2b2e26c70b83a0bb9f31afc7a21c2ec58b968f6b1e3c61c8e8f0a11",
        "receiptsRoot": "0xf78dfb743fbd92ade140711c8bbc542b5e307f0ab7984eff35d751969fe57efa",
        "logsBloom": zero_bloom(),
        "difficulty": "0x2",
        "number": "0x7",
        "gasLimit": "0x1c9c380",
        "gasUsed": "0x5208",
        "timestamp": "0x64b8f00f",
        "extraData": "0x",
        "mixHash": "0x0000000000000000000000000000000000000000000000000000000000000000",
        "nonce": "0x0000000000000000",
        "baseFeePerGas": "0x3b9aca00",
        "totalDifficulty": "0x2",
        "size": "0x2f3",
        "uncles": [],
        "transactions": [tx_json(true)]
    })
}

fn receipt_json() -> Value {
    json!({
        "transactionHash": TX_HASH,
        "transactionIndex": "0x0",
        "blockHash": BLOCK_HASH,
        "blockNumber": "0x7",
        "from": "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266",
        "to": "0x70997970c51812dc3a010c7d01b50e0d17dc79c8",
        "gasUsed": "0x5208",
        "cumulativeGasUsed": "0x5208",
        "contractAddress": null,
        "logs": [{
            "address": "0x5fbdb2315678afecb367f032d93f642f64180aa3",
            "topics": ["0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"],
            "data": "0x",
            "blockHash": BLOCK_HASH,
            "blockNumber": "0x7",
            "transactionHash": TX_HASH,
            "transactionIndex": "0x0",
            "logIndex": "0x0",
            "removed": false
        }],
        "status": "0x1",
        "logsBloom": zero_bloom(),
        "type": "0x0",
        "effectiveGasPrice": "0x3b9aca00"
    })
}

async fn accessor_for(reply: MockReply) -> NodeAccessor {
    common::init_tracing();
    let addr = start_mock_node(reply).await;
    NodeAccessor::connect(&format!("http://{}", addr)).unwrap()
}

#[tokio::test]
async fn block_by_number_decodes_full_transactions() {
    let accessor = accessor_for(MockReply::Result(block_json())).await;
    let block = accessor.block(Some(7)).await.unwrap();

    assert_eq!(block.header.number, 7);
    assert_eq!(block.header.hash, BLOCK_HASH.parse::<B256>().unwrap());
    assert_eq!(block.header.timestamp, 0x64b8f00f);
    assert_eq!(block.header.difficulty, U256::from(2));

    assert!(block.transactions.is_full());
    assert_eq!(block.transactions.len(), 1);
    let hashes: Vec<_> = block.transactions.hashes().collect();
    assert_eq!(hashes, vec![TX_HASH.parse::<B256>().unwrap()]);
}

#[tokio::test]
async fn block_number_matches_transaction_count() {
    let block_accessor = accessor_for(MockReply::Result(block_json())).await;
    let block = block_accessor.block(Some(7)).await.unwrap();
    assert_eq!(block.header.number, 7);

    // Counting the same block by its hash agrees with the embedded list.
    let count_accessor = accessor_for(MockReply::Result(json!("0x1"))).await;
    let count = count_accessor
        .transaction_count(BlockId::hash(block.header.hash))
        .await
        .unwrap();
    assert_eq!(count as usize, block.transactions.len());
}

#[tokio::test]
async fn mined_transaction_is_not_pending() {
    let accessor = accessor_for(MockReply::Result(tx_json(true))).await;
    let (tx, is_pending) = accessor.transaction(TX_HASH.parse().unwrap()).await.unwrap();
    assert!(!is_pending);
    assert_eq!(tx.block_number, Some(7));
    assert_eq!(tx.block_hash, Some(BLOCK_HASH.parse().unwrap()));
}

#[tokio::test]
async fn pool_transaction_is_pending() {
    let accessor = accessor_for(MockReply::Result(tx_json(false))).await;
    let (tx, is_pending) = accessor.transaction(TX_HASH.parse().unwrap()).await.unwrap();
    assert!(is_pending);
    assert_eq!(tx.block_hash, None);
    assert_eq!(tx.block_number, None);
}

#[tokio::test]
async fn empty_code_means_plain_account() {
    let accessor = accessor_for(MockReply::Result(json!("0x"))).await;
    let code = accessor.code(Address::ZERO, None).await.unwrap();
    assert!(code.is_empty());
    assert!(!accessor.is_contract(Address::ZERO).await.unwrap());
}

#[tokio::test]
async fn bytecode_means_contract_account() {
    let accessor = accessor_for(MockReply::Result(json!("0x6080604052"))).await;
    let code = accessor.code(Address::ZERO, Some(7)).await.unwrap();
    assert_eq!(code.len(), 5);
    assert!(accessor.is_contract(Address::ZERO).await.unwrap());
}

#[tokio::test]
async fn mined_receipt_decodes_status_and_logs() {
    let accessor = accessor_for(MockReply::Result(receipt_json())).await;
    let receipt = accessor.receipt(TX_HASH.parse().unwrap()).await.unwrap();

    assert!(receipt.status());
    assert_eq!(receipt.block_number, Some(7));
    assert_eq!(receipt.inner.logs().len(), 1);
}
