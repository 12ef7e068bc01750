//! In-memory [`ChainStore`] backed by [`dashmap::DashMap`].
//!
//! Used by the mempool engine (whose rows never need to survive a restart)
//! and by tests that want a store without a filesystem dependency.

use dashmap::DashMap;

use chain_core::codec::Hash32;
use chain_core::types::{TxIn, TxOut};

use crate::error::StoreError;
use crate::keys::RowKey;
use crate::record::{BlockRecord, TransactionRecord};
use crate::traits::ChainStore;

#[derive(Default)]
pub struct MemoryStore {
    tip: DashMap<(), BlockRecord>,
    block_history: DashMap<String, BlockRecord>,
    transaction: DashMap<String, TransactionRecord>,
    vin: DashMap<(String, String), TxIn>,
    vin_by_utxo: DashMap<(String, u32), TxIn>,
    output: DashMap<(String, String), TxOut>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChainStore for MemoryStore {
    fn get_tip(&self) -> Result<Option<BlockRecord>, StoreError> {
        Ok(self.tip.get(&()).map(|r| r.clone()))
    }

    fn put_tip(&self, record: &BlockRecord) -> Result<(), StoreError> {
        self.tip.insert((), record.clone());
        Ok(())
    }

    fn delete_tip(&self) -> Result<(), StoreError> {
        self.tip.remove(&());
        Ok(())
    }

    fn get_block_history(&self, hash: &Hash32) -> Result<Option<BlockRecord>, StoreError> {
        Ok(self.block_history.get(&hash.to_hex()).map(|r| r.clone()))
    }

    fn put_block_history(&self, record: &BlockRecord) -> Result<(), StoreError> {
        self.block_history.insert(record.hash.to_hex(), record.clone());
        Ok(())
    }

    fn delete_block_history(&self, hash: &Hash32) -> Result<(), StoreError> {
        self.block_history.remove(&hash.to_hex());
        Ok(())
    }

    fn get_transaction(&self, txid: &Hash32) -> Result<Option<TransactionRecord>, StoreError> {
        Ok(self.transaction.get(&txid.to_hex()).map(|r| r.clone()))
    }

    fn put_transaction(&self, record: &TransactionRecord) -> Result<(), StoreError> {
        self.transaction.insert(record.txid.to_hex(), record.clone());
        Ok(())
    }

    fn delete_transaction(&self, txid: &Hash32) -> Result<(), StoreError> {
        self.transaction.remove(&txid.to_hex());
        Ok(())
    }

    fn query_transactions_by_block(&self, block_hash: &Hash32) -> Result<Vec<TransactionRecord>, StoreError> {
        let hex = block_hash.to_hex();
        Ok(self
            .transaction
            .iter()
            .filter(|entry| entry.value().block_hash.to_hex() == hex)
            .map(|entry| entry.value().clone())
            .collect())
    }

    fn query_mempool_transactions(&self) -> Result<Vec<TransactionRecord>, StoreError> {
        Ok(self
            .transaction
            .iter()
            .filter(|entry| entry.value().block_hash.is_zero())
            .map(|entry| entry.value().clone())
            .collect())
    }

    fn get_vins(&self, txid: &Hash32) -> Result<Vec<TxIn>, StoreError> {
        let hex = txid.to_hex();
        let mut rows: Vec<(String, TxIn)> = self
            .vin
            .iter()
            .filter(|entry| entry.key().0 == hex)
            .map(|entry| (entry.key().1.clone(), entry.value().clone()))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(rows.into_iter().map(|(_, v)| v).collect())
    }

    fn put_vin(&self, txid: &Hash32, vin: &TxIn) -> Result<(), StoreError> {
        let n = vin.n.expect("vin must have a position assigned before storage");
        let row = RowKey::position(n).0;
        self.vin.insert((txid.to_hex(), row), vin.clone());
        self.vin_by_utxo.insert((vin.utxo_txid.to_hex(), vin.utxo_vout), vin.clone());
        Ok(())
    }

    fn delete_vins(&self, txid: &Hash32) -> Result<(), StoreError> {
        let hex = txid.to_hex();
        let removed: Vec<_> = self
            .vin
            .iter()
            .filter(|entry| entry.key().0 == hex)
            .map(|entry| entry.key().clone())
            .collect();
        for key in removed {
            if let Some((_, vin)) = self.vin.remove(&key) {
                self.vin_by_utxo.remove(&(vin.utxo_txid.to_hex(), vin.utxo_vout));
            }
        }
        Ok(())
    }

    fn find_spending_vin(&self, utxo_txid: &Hash32, utxo_vout: u32) -> Result<Option<TxIn>, StoreError> {
        Ok(self.vin_by_utxo.get(&(utxo_txid.to_hex(), utxo_vout)).map(|r| r.clone()))
    }

    fn get_output(&self, txid: &Hash32, vout: u32) -> Result<Option<TxOut>, StoreError> {
        let row = RowKey::position(vout).0;
        Ok(self.output.get(&(txid.to_hex(), row)).map(|r| r.clone()))
    }

    fn get_outputs(&self, txid: &Hash32) -> Result<Vec<TxOut>, StoreError> {
        let hex = txid.to_hex();
        let mut rows: Vec<(String, TxOut)> = self
            .output
            .iter()
            .filter(|entry| entry.key().0 == hex)
            .map(|entry| (entry.key().1.clone(), entry.value().clone()))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(rows.into_iter().map(|(_, v)| v).collect())
    }

    fn put_output(&self, txid: &Hash32, output: &TxOut) -> Result<(), StoreError> {
        let n = output.n.expect("output must have a position assigned before storage");
        let row = RowKey::position(n).0;
        self.output.insert((txid.to_hex(), row), output.clone());
        Ok(())
    }

    fn delete_outputs(&self, txid: &Hash32) -> Result<(), StoreError> {
        let hex = txid.to_hex();
        let removed: Vec<_> = self
            .output
            .iter()
            .filter(|entry| entry.key().0 == hex)
            .map(|entry| entry.key().clone())
            .collect();
        for key in removed {
            self.output.remove(&key);
        }
        Ok(())
    }
}
