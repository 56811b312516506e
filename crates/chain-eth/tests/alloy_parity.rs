//! Signing hashes cross-checked against alloy's consensus types.

use alloy_consensus::{SignableTransaction, TxEip1559, TxEip2930, TxEip4844, TxLegacy};
use alloy_primitives::{Address as AlloyAddress, Bytes, TxKind, B256, U256};
use chain_eth::Transaction;
use eth_primitives::{Address, BigInt, Hash};

const TO: [u8; 20] = [0x35; 20];
const DATA: [u8; 4] = [0xa9, 0x05, 0x9c, 0xbb];

fn assert_same_hash(ours: Hash, theirs: B256) {
    assert_eq!(ours.0, theirs.0, "signing hash differs from alloy");
}

#[test]
fn legacy_eip155_matches_alloy() {
    let ours = Transaction::legacy()
        .with_chain_id(Some(1))
        .with_nonce(9)
        .with_gas_price(BigInt::from(20_000_000_000u64))
        .with_gas_limit(21_000)
        .with_to(Some(Address(TO)))
        .with_value(BigInt::from(1_000_000_000_000_000_000u64));
    let theirs = TxLegacy {
        chain_id: Some(1),
        nonce: 9,
        gas_price: 20_000_000_000,
        gas_limit: 21_000,
        to: TxKind::Call(AlloyAddress::from(TO)),
        value: U256::from(1_000_000_000_000_000_000u64),
        input: Bytes::new(),
    };
    assert_same_hash(ours.signing_hash(None).unwrap(), theirs.signature_hash());
}

#[test]
fn legacy_without_chain_id_matches_alloy() {
    let ours = Transaction::legacy()
        .with_nonce(1)
        .with_gas_price(BigInt::from(1u64))
        .with_gas_limit(100_000)
        .with_data(DATA.to_vec());
    let theirs = TxLegacy {
        chain_id: None,
        nonce: 1,
        gas_price: 1,
        gas_limit: 100_000,
        to: TxKind::Create,
        input: Bytes::from(DATA.to_vec()),
        ..Default::default()
    };
    assert_same_hash(ours.signing_hash(None).unwrap(), theirs.signature_hash());
}

#[test]
fn access_list_kind_matches_alloy() {
    let ours = Transaction::eip2930()
        .with_chain_id(Some(5))
        .with_nonce(2)
        .with_gas_price(BigInt::from(3_000_000_000u64))
        .with_gas_limit(60_000)
        .with_to(Some(Address(TO)))
        .with_data(DATA.to_vec());
    let theirs = TxEip2930 {
        chain_id: 5,
        nonce: 2,
        gas_price: 3_000_000_000,
        gas_limit: 60_000,
        to: TxKind::Call(AlloyAddress::from(TO)),
        input: Bytes::from(DATA.to_vec()),
        ..Default::default()
    };
    assert_same_hash(ours.signing_hash(None).unwrap(), theirs.signature_hash());
}

#[test]
fn dynamic_fee_kind_matches_alloy() {
    let ours = Transaction::eip1559()
        .with_chain_id(Some(1))
        .with_nonce(7)
        .with_gas_price(BigInt::from(40_000_000_000u64))
        .with_priority_fee(BigInt::from(2_000_000_000u64))
        .unwrap()
        .with_gas_limit(21_000)
        .with_to(Some(Address(TO)))
        .with_value(BigInt::from(12_345u64));
    let theirs = TxEip1559 {
        chain_id: 1,
        nonce: 7,
        max_fee_per_gas: 40_000_000_000,
        max_priority_fee_per_gas: 2_000_000_000,
        gas_limit: 21_000,
        to: TxKind::Call(AlloyAddress::from(TO)),
        value: U256::from(12_345u64),
        ..Default::default()
    };
    assert_same_hash(ours.signing_hash(None).unwrap(), theirs.signature_hash());
}

#[test]
fn blob_kind_matches_alloy() {
    let mut versioned = [0x22u8; 32];
    versioned[0] = 0x01;
    let ours = Transaction::eip4844()
        .with_chain_id(Some(11_155_111))
        .with_nonce(1)
        .with_gas_price(BigInt::from(50u64))
        .with_priority_fee(BigInt::from(5u64))
        .unwrap()
        .with_gas_limit(90_000)
        .with_to(Some(Address(TO)))
        .with_data(DATA.to_vec())
        .with_max_fee_per_blob_gas(BigInt::from(9u64))
        .unwrap()
        .with_blob_versioned_hashes(vec![Hash(versioned)])
        .unwrap();
    let theirs = TxEip4844 {
        chain_id: 11_155_111,
        nonce: 1,
        max_fee_per_gas: 50,
        max_priority_fee_per_gas: 5,
        gas_limit: 90_000,
        to: AlloyAddress::from(TO),
        input: Bytes::from(DATA.to_vec()),
        max_fee_per_blob_gas: 9,
        blob_versioned_hashes: vec![B256::from(versioned)],
        ..Default::default()
    };
    assert_same_hash(ours.signing_hash(None).unwrap(), theirs.signature_hash());
}
