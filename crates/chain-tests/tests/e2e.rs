//! End-to-end lifecycle tests: block acceptance, linked acceptance,
//! double-spend rejection, mempool admission, mempool value-imbalance
//! rejection, and low-S signature rejection, run against an in-memory
//! store through the same public entry points the HTTP surface calls.

use chain_core::codec::{dsha256_display, Hash32};
use chain_core::constants::MIN_ALLOWED_BITS;
use chain_core::serialize::{block_header_raw, tx_legacy_raw};
use chain_core::types::{Block, Transaction, TxIn, TxOut};
use chain_engine::{admit_to_mempool, create_block, EngineConfig, EngineError};
use chain_script::ScriptError;
use chain_store::{ChainStore, MemoryStore};
use chain_tests::helpers::{block_with_coinbase, coinbase_tx, script_pair, Payee};

const SUBSIDY: u64 = 50_0000_0000;

fn config() -> EngineConfig {
    EngineConfig::new(MIN_ALLOWED_BITS, SUBSIDY).unwrap()
}

#[test]
fn genesis_block_is_accepted_at_height_zero() {
    let store = MemoryStore::new();
    let cfg = config();
    let genesis = block_with_coinbase(Hash32::ZERO, cfg.subsidy, cfg.bits, 1_231_006_505);

    let accepted = create_block(&store, &cfg, genesis).unwrap();

    assert_eq!(accepted.height, 0);
    let tip = store.get_tip().unwrap().unwrap();
    assert_eq!(tip.hash, accepted.hash);
}

/// Builds a second block spending the genesis coinbase's lone `OP_TRUE`
/// output to a real P2PKH address, exercising two transactions (coinbase
/// plus a payment) and a real merkle root over both txids.
fn linked_block(previous: &Block, payee: &Payee, timestamp: u32) -> (Block, Transaction) {
    let cfg = config();
    let coinbase = coinbase_tx(cfg.subsidy);

    // genesis's scriptPubKey is OP_TRUE, so an empty scriptSig satisfies it
    // with no signature required.
    let genesis_tx = &previous.transactions[0];
    let spend_vin = TxIn {
        utxo_txid: genesis_tx.txid,
        utxo_vout: 0,
        sequence: 0xFFFF_FFFF,
        script_sig: script_pair(&[]),
        utxo_block_hash: None,
        utxo_script_pubkey: None,
        utxo_value: None,
        script_type: None,
        spent_txid: None,
        spent_block_hash: None,
        n: None,
    };
    let spend_out = TxOut {
        value: genesis_tx.outputs[0].value,
        script_pubkey: script_pair(&payee.script_pubkey),
        script_type: None,
        block_hash: None,
        txid: None,
        n: None,
    };
    let vin = vec![spend_vin];
    let outputs = vec![spend_out];
    let raw = tx_legacy_raw(1, &vin, &outputs, 0);
    let txid = dsha256_display(&raw);
    let payment = Transaction::new(txid, 1, 0, 0, vin, outputs).unwrap();

    let txids = vec![coinbase.txid, payment.txid];
    let merkle_root = chain_core::merkle::merkle_root(&txids);
    let header_raw = block_header_raw(1, &previous.hash, &merkle_root, timestamp, cfg.bits, 0);
    let hash = dsha256_display(&header_raw);
    let block =
        Block::new(hash, previous.hash, merkle_root, 1, timestamp, cfg.bits, 0, vec![coinbase, payment.clone()])
            .unwrap();
    (block, payment)
}

#[test]
fn linked_block_is_accepted_at_height_one_with_queryable_rows() {
    let store = MemoryStore::new();
    let cfg = config();
    let genesis = block_with_coinbase(Hash32::ZERO, cfg.subsidy, cfg.bits, 1_231_006_505);
    let accepted_genesis = create_block(&store, &cfg, genesis).unwrap();

    let payee = Payee::new(0x42);
    let (second, _) = linked_block(&accepted_genesis, &payee, 1_231_469_665);
    let payment_txid = second.transactions[1].txid;

    let accepted = create_block(&store, &cfg, second).unwrap();

    assert_eq!(accepted.height, 1);
    let record = store.get_transaction(&payment_txid).unwrap().unwrap();
    assert_eq!(store.get_vins(&record.txid).unwrap().len(), 1);
    assert_eq!(store.get_outputs(&record.txid).unwrap().len(), 1);
}

#[test]
fn reusing_a_spent_utxo_in_a_later_block_is_rejected() {
    let store = MemoryStore::new();
    let cfg = config();
    let genesis = block_with_coinbase(Hash32::ZERO, cfg.subsidy, cfg.bits, 1_231_006_505);
    let accepted_genesis = create_block(&store, &cfg, genesis).unwrap();

    let payee = Payee::new(0x42);
    let (second, _) = linked_block(&accepted_genesis, &payee, 1_231_469_665);
    let accepted_second = create_block(&store, &cfg, second).unwrap();

    // A third block whose sole non-coinbase transaction spends the same
    // genesis output the second block already spent.
    let coinbase = chain_tests::helpers::coinbase_tx(cfg.subsidy);
    let reused_vin = TxIn {
        utxo_txid: accepted_genesis.transactions[0].txid,
        utxo_vout: 0,
        sequence: 0xFFFF_FFFF,
        script_sig: script_pair(&[]),
        utxo_block_hash: None,
        utxo_script_pubkey: None,
        utxo_value: None,
        script_type: None,
        spent_txid: None,
        spent_block_hash: None,
        n: None,
    };
    let reused_out =
        TxOut { value: cfg.subsidy, script_pubkey: script_pair(&payee.script_pubkey), script_type: None, block_hash: None, txid: None, n: None };
    let raw = tx_legacy_raw(1, &[reused_vin.clone()], &[reused_out.clone()], 0);
    let dup_txid = dsha256_display(&raw);
    let dup_payment = Transaction::new(dup_txid, 1, 0, 0, vec![reused_vin], vec![reused_out]).unwrap();

    let txids = vec![coinbase.txid, dup_payment.txid];
    let merkle_root = chain_core::merkle::merkle_root(&txids);
    let header_raw = block_header_raw(1, &accepted_second.hash, &merkle_root, 1_231_469_800, cfg.bits, 0);
    let hash = dsha256_display(&header_raw);
    let block = Block::new(
        hash,
        accepted_second.hash,
        merkle_root,
        1,
        1_231_469_800,
        cfg.bits,
        0,
        vec![coinbase, dup_payment],
    )
    .unwrap();

    let err = create_block(&store, &cfg, block).unwrap_err();
    assert!(matches!(err, EngineError::UtxoAlreadySpent { .. }));
}

#[test]
fn balanced_mempool_transaction_is_admitted_and_listed() {
    let store = MemoryStore::new();
    let cfg = config();
    let genesis = block_with_coinbase(Hash32::ZERO, cfg.subsidy, cfg.bits, 1_231_006_505);
    let accepted_genesis = create_block(&store, &cfg, genesis).unwrap();
    let genesis_txid = accepted_genesis.transactions[0].txid;

    let payee = Payee::new(0x77);
    let vin = TxIn {
        utxo_txid: genesis_txid,
        utxo_vout: 0,
        sequence: 0xFFFF_FFFF,
        script_sig: script_pair(&[]),
        utxo_block_hash: None,
        utxo_script_pubkey: None,
        utxo_value: None,
        script_type: None,
        spent_txid: None,
        spent_block_hash: None,
        n: None,
    };
    let out =
        TxOut { value: cfg.subsidy, script_pubkey: script_pair(&payee.script_pubkey), script_type: None, block_hash: None, txid: None, n: None };
    let raw = tx_legacy_raw(1, &[vin.clone()], &[out.clone()], 0);
    let txid = dsha256_display(&raw);
    let tx = Transaction::new(txid, 1, 0, 0, vec![vin], vec![out]).unwrap();

    let admitted = admit_to_mempool(&store, tx, 1_700_000_000).unwrap();
    assert!(admitted.block_hash.is_zero());

    let pending = store.query_mempool_transactions().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].txid, admitted.txid);
}

#[test]
fn mempool_value_imbalance_is_rejected() {
    let store = MemoryStore::new();
    let cfg = config();
    let genesis = block_with_coinbase(Hash32::ZERO, cfg.subsidy, cfg.bits, 1_231_006_505);
    let accepted_genesis = create_block(&store, &cfg, genesis).unwrap();
    let genesis_txid = accepted_genesis.transactions[0].txid;

    let payee = Payee::new(0x77);
    let vin = TxIn {
        utxo_txid: genesis_txid,
        utxo_vout: 0,
        sequence: 0xFFFF_FFFF,
        script_sig: script_pair(&[]),
        utxo_block_hash: None,
        utxo_script_pubkey: None,
        utxo_value: None,
        script_type: None,
        spent_txid: None,
        spent_block_hash: None,
        n: None,
    };
    // One satoshi more than the UTXO being spent: inputs != outputs + fee.
    let out = TxOut {
        value: cfg.subsidy + 1,
        script_pubkey: script_pair(&payee.script_pubkey),
        script_type: None,
        block_hash: None,
        txid: None,
        n: None,
    };
    let raw = tx_legacy_raw(1, &[vin.clone()], &[out.clone()], 0);
    let txid = dsha256_display(&raw);
    let tx = Transaction::new(txid, 1, 0, 0, vec![vin], vec![out]).unwrap();

    let err = admit_to_mempool(&store, tx, 1_700_000_000).unwrap_err();
    assert!(matches!(err, EngineError::ValueImbalance { .. }));
}

#[test]
fn high_s_signature_is_rejected_at_current_timestamp() {
    let store = MemoryStore::new();
    let cfg = config();

    // Fund a P2PKH output directly in genesis instead of the OP_TRUE
    // fixture, so the spending input must carry a real signature.
    let payee = Payee::new(0x99);
    let coinbase_vin = TxIn {
        utxo_txid: Hash32::ZERO,
        utxo_vout: 0xFFFF_FFFF,
        sequence: 0xFFFF_FFFF,
        script_sig: script_pair(&[0x51]),
        utxo_block_hash: None,
        utxo_script_pubkey: None,
        utxo_value: None,
        script_type: None,
        spent_txid: None,
        spent_block_hash: None,
        n: None,
    };
    let coinbase_out = TxOut {
        value: cfg.subsidy,
        script_pubkey: script_pair(&payee.script_pubkey),
        script_type: None,
        block_hash: None,
        txid: None,
        n: None,
    };
    let raw = tx_legacy_raw(1, &[coinbase_vin.clone()], &[coinbase_out.clone()], 0);
    let coinbase_txid = dsha256_display(&raw);
    let coinbase = Transaction::new(coinbase_txid, 1, 0, 0, vec![coinbase_vin], vec![coinbase_out]).unwrap();
    let header_raw = block_header_raw(1, &Hash32::ZERO, &coinbase.txid, 1_231_006_505, cfg.bits, 0);
    let hash = dsha256_display(&header_raw);
    let genesis = Block::new(hash, Hash32::ZERO, coinbase.txid, 1, 1_231_006_505, cfg.bits, 0, vec![coinbase]).unwrap();
    create_block(&store, &cfg, genesis).unwrap();

    let unsigned_vin = TxIn {
        utxo_txid: coinbase_txid,
        utxo_vout: 0,
        sequence: 0xFFFF_FFFF,
        script_sig: script_pair(&[]),
        utxo_block_hash: None,
        utxo_script_pubkey: None,
        utxo_value: None,
        script_type: None,
        spent_txid: None,
        spent_block_hash: None,
        n: None,
    };
    let spend_out =
        TxOut { value: cfg.subsidy, script_pubkey: script_pair(&[0x51]), script_type: None, block_hash: None, txid: None, n: None };
    let raw = tx_legacy_raw(1, &[unsigned_vin.clone()], &[spend_out.clone()], 0);
    let placeholder_txid = dsha256_display(&raw);
    let placeholder = Transaction::new(placeholder_txid, 1, 0, 0, vec![unsigned_vin], vec![spend_out.clone()]).unwrap();

    let script_sig_bytes = payee.sign(&placeholder, 0, true);
    let signed_vin = TxIn { script_sig: script_pair(&script_sig_bytes), ..placeholder.vin[0].clone() };
    let raw = tx_legacy_raw(1, &[signed_vin.clone()], &[spend_out.clone()], 0);
    let txid = dsha256_display(&raw);
    let tx = Transaction::new(txid, 1, 0, 0, vec![signed_vin], vec![spend_out]).unwrap();

    let err = admit_to_mempool(&store, tx, 1_700_000_000).unwrap_err();
    match err {
        EngineError::ScriptFailed { source, .. } => assert_eq!(source, ScriptError::NotTrueAtEnd),
        other => panic!("expected a script failure from the high-S signature, got {other:?}"),
    }
}
