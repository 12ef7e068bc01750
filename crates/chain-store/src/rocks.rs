//! RocksDB-backed [`ChainStore`].
//!
//! Column families mirror the partitioned table layout directly: one CF
//! per table, plus a `vin_by_utxo` secondary index so the spent-check
//! (`find_spending_vin`) doesn't require a full-table scan keyed by the
//! wrong partition (`transaction_vin` is partitioned by the *spending*
//! txid, not by the UTXO it references). Composite keys inside a partition
//! are `partition_key ∥ 0x00 ∥ row_key`, matching the `PartitionKey ∥ 0x00 ∥
//! RowKey` convention the positional tables use.

use std::path::Path;

use rocksdb::{ColumnFamilyDescriptor, Options, WriteBatch, DB};

use chain_core::codec::Hash32;
use chain_core::types::{TxIn, TxOut};

use crate::error::StoreError;
use crate::keys::RowKey;
use crate::record::{BlockRecord, TransactionRecord};
use crate::traits::ChainStore;

const CF_BLOCK_TIP: &str = "block_tip";
const CF_BLOCK_HISTORY: &str = "block_history";
const CF_TRANSACTION: &str = "transaction";
const CF_VIN: &str = "transaction_vin";
const CF_VIN_BY_UTXO: &str = "vin_by_utxo";
const CF_OUTPUT: &str = "transaction_output";

const ALL_CFS: &[&str] = &[CF_BLOCK_TIP, CF_BLOCK_HISTORY, CF_TRANSACTION, CF_VIN, CF_VIN_BY_UTXO, CF_OUTPUT];

const TIP_KEY: &[u8] = b"TIP";

pub struct RocksStore {
    db: DB,
}

impl RocksStore {
    /// Open or create a RocksDB database at `path`, creating any missing
    /// column families.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        let cf_descriptors: Vec<ColumnFamilyDescriptor> =
            ALL_CFS.iter().map(|name| ColumnFamilyDescriptor::new(*name, Options::default())).collect();

        let db = DB::open_cf_descriptors(&db_opts, path.as_ref(), cf_descriptors)
            .map_err(|e| StoreError::Io(e.to_string()))?;

        Ok(Self { db })
    }

    fn cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily, StoreError> {
        self.db.cf_handle(name).ok_or_else(|| StoreError::Io(format!("missing column family: {name}")))
    }

    fn encode<T: serde::Serialize>(table: &'static str, value: &T) -> Result<Vec<u8>, StoreError> {
        bincode::serde::encode_to_vec(value, bincode::config::standard()).map_err(|source| StoreError::Codec { table, source })
    }

    fn decode<T: serde::de::DeserializeOwned>(table: &'static str, bytes: &[u8]) -> Result<T, StoreError> {
        bincode::serde::decode_from_slice(bytes, bincode::config::standard())
            .map(|(value, _)| value)
            .map_err(|source| StoreError::Decode { table, source })
    }
}

fn composite_key(partition: &str, row: &str) -> Vec<u8> {
    let mut key = partition.as_bytes().to_vec();
    key.push(0x00);
    key.extend_from_slice(row.as_bytes());
    key
}

fn utxo_key(utxo_txid: &Hash32, utxo_vout: u32) -> Vec<u8> {
    let mut key = utxo_txid.to_hex().into_bytes();
    key.push(0x00);
    key.extend_from_slice(&utxo_vout.to_be_bytes());
    key
}

impl ChainStore for RocksStore {
    fn get_tip(&self) -> Result<Option<BlockRecord>, StoreError> {
        let cf = self.cf(CF_BLOCK_TIP)?;
        match self.db.get_cf(cf, TIP_KEY).map_err(|e| StoreError::Io(e.to_string()))? {
            Some(bytes) => Ok(Some(Self::decode(CF_BLOCK_TIP, &bytes)?)),
            None => Ok(None),
        }
    }

    fn put_tip(&self, record: &BlockRecord) -> Result<(), StoreError> {
        let cf = self.cf(CF_BLOCK_TIP)?;
        let bytes = Self::encode(CF_BLOCK_TIP, record)?;
        self.db.put_cf(cf, TIP_KEY, bytes).map_err(|e| StoreError::Io(e.to_string()))
    }

    fn delete_tip(&self) -> Result<(), StoreError> {
        let cf = self.cf(CF_BLOCK_TIP)?;
        self.db.delete_cf(cf, TIP_KEY).map_err(|e| StoreError::Io(e.to_string()))
    }

    fn get_block_history(&self, hash: &Hash32) -> Result<Option<BlockRecord>, StoreError> {
        let cf = self.cf(CF_BLOCK_HISTORY)?;
        match self.db.get_cf(cf, hash.to_hex().as_bytes()).map_err(|e| StoreError::Io(e.to_string()))? {
            Some(bytes) => Ok(Some(Self::decode(CF_BLOCK_HISTORY, &bytes)?)),
            None => Ok(None),
        }
    }

    fn put_block_history(&self, record: &BlockRecord) -> Result<(), StoreError> {
        let cf = self.cf(CF_BLOCK_HISTORY)?;
        let bytes = Self::encode(CF_BLOCK_HISTORY, record)?;
        self.db.put_cf(cf, record.hash.to_hex().as_bytes(), bytes).map_err(|e| StoreError::Io(e.to_string()))
    }

    fn delete_block_history(&self, hash: &Hash32) -> Result<(), StoreError> {
        let cf = self.cf(CF_BLOCK_HISTORY)?;
        self.db.delete_cf(cf, hash.to_hex().as_bytes()).map_err(|e| StoreError::Io(e.to_string()))
    }

    fn get_transaction(&self, txid: &Hash32) -> Result<Option<TransactionRecord>, StoreError> {
        let cf = self.cf(CF_TRANSACTION)?;
        match self.db.get_cf(cf, txid.to_hex().as_bytes()).map_err(|e| StoreError::Io(e.to_string()))? {
            Some(bytes) => Ok(Some(Self::decode(CF_TRANSACTION, &bytes)?)),
            None => Ok(None),
        }
    }

    fn put_transaction(&self, record: &TransactionRecord) -> Result<(), StoreError> {
        let cf = self.cf(CF_TRANSACTION)?;
        let bytes = Self::encode(CF_TRANSACTION, record)?;
        self.db.put_cf(cf, record.txid.to_hex().as_bytes(), bytes).map_err(|e| StoreError::Io(e.to_string()))
    }

    fn delete_transaction(&self, txid: &Hash32) -> Result<(), StoreError> {
        let cf = self.cf(CF_TRANSACTION)?;
        self.db.delete_cf(cf, txid.to_hex().as_bytes()).map_err(|e| StoreError::Io(e.to_string()))
    }

    fn query_transactions_by_block(&self, block_hash: &Hash32) -> Result<Vec<TransactionRecord>, StoreError> {
        let cf = self.cf(CF_TRANSACTION)?;
        let mut out = Vec::new();
        for item in self.db.iterator_cf(cf, rocksdb::IteratorMode::Start) {
            let (_, value) = item.map_err(|e| StoreError::Io(e.to_string()))?;
            let record: TransactionRecord = Self::decode(CF_TRANSACTION, &value)?;
            if record.block_hash == *block_hash {
                out.push(record);
            }
        }
        Ok(out)
    }

    fn query_mempool_transactions(&self) -> Result<Vec<TransactionRecord>, StoreError> {
        let cf = self.cf(CF_TRANSACTION)?;
        let mut out = Vec::new();
        for item in self.db.iterator_cf(cf, rocksdb::IteratorMode::Start) {
            let (_, value) = item.map_err(|e| StoreError::Io(e.to_string()))?;
            let record: TransactionRecord = Self::decode(CF_TRANSACTION, &value)?;
            if record.block_hash.is_zero() {
                out.push(record);
            }
        }
        Ok(out)
    }

    fn get_vins(&self, txid: &Hash32) -> Result<Vec<TxIn>, StoreError> {
        let cf = self.cf(CF_VIN)?;
        let prefix = {
            let mut p = txid.to_hex().into_bytes();
            p.push(0x00);
            p
        };
        let mut out = Vec::new();
        for item in self.db.prefix_iterator_cf(cf, &prefix) {
            let (key, value) = item.map_err(|e| StoreError::Io(e.to_string()))?;
            if !key.starts_with(&prefix) {
                break;
            }
            out.push(Self::decode(CF_VIN, &value)?);
        }
        Ok(out)
    }

    fn put_vin(&self, txid: &Hash32, vin: &TxIn) -> Result<(), StoreError> {
        let n = vin.n.expect("vin must have a position assigned before storage");
        let row = RowKey::position(n).0;
        let key = composite_key(&txid.to_hex(), &row);
        let bytes = Self::encode(CF_VIN, vin)?;

        let cf_vin = self.cf(CF_VIN)?;
        let cf_index = self.cf(CF_VIN_BY_UTXO)?;
        let index_key = utxo_key(&vin.utxo_txid, vin.utxo_vout);

        let mut batch = WriteBatch::default();
        batch.put_cf(cf_vin, &key, &bytes);
        batch.put_cf(cf_index, &index_key, &bytes);
        self.db.write(batch).map_err(|e| StoreError::Io(e.to_string()))
    }

    fn delete_vins(&self, txid: &Hash32) -> Result<(), StoreError> {
        let vins = self.get_vins(txid)?;
        let cf_vin = self.cf(CF_VIN)?;
        let cf_index = self.cf(CF_VIN_BY_UTXO)?;
        let mut batch = WriteBatch::default();
        for vin in &vins {
            let n = vin.n.expect("stored vin always has a position");
            let row = RowKey::position(n).0;
            batch.delete_cf(cf_vin, composite_key(&txid.to_hex(), &row));
            batch.delete_cf(cf_index, utxo_key(&vin.utxo_txid, vin.utxo_vout));
        }
        self.db.write(batch).map_err(|e| StoreError::Io(e.to_string()))
    }

    fn find_spending_vin(&self, utxo_txid: &Hash32, utxo_vout: u32) -> Result<Option<TxIn>, StoreError> {
        let cf = self.cf(CF_VIN_BY_UTXO)?;
        match self.db.get_cf(cf, utxo_key(utxo_txid, utxo_vout)).map_err(|e| StoreError::Io(e.to_string()))? {
            Some(bytes) => Ok(Some(Self::decode(CF_VIN_BY_UTXO, &bytes)?)),
            None => Ok(None),
        }
    }

    fn get_output(&self, txid: &Hash32, vout: u32) -> Result<Option<TxOut>, StoreError> {
        let cf = self.cf(CF_OUTPUT)?;
        let row = RowKey::position(vout).0;
        let key = composite_key(&txid.to_hex(), &row);
        match self.db.get_cf(cf, key).map_err(|e| StoreError::Io(e.to_string()))? {
            Some(bytes) => Ok(Some(Self::decode(CF_OUTPUT, &bytes)?)),
            None => Ok(None),
        }
    }

    fn get_outputs(&self, txid: &Hash32) -> Result<Vec<TxOut>, StoreError> {
        let cf = self.cf(CF_OUTPUT)?;
        let prefix = {
            let mut p = txid.to_hex().into_bytes();
            p.push(0x00);
            p
        };
        let mut out = Vec::new();
        for item in self.db.prefix_iterator_cf(cf, &prefix) {
            let (key, value) = item.map_err(|e| StoreError::Io(e.to_string()))?;
            if !key.starts_with(&prefix) {
                break;
            }
            out.push(Self::decode(CF_OUTPUT, &value)?);
        }
        Ok(out)
    }

    fn put_output(&self, txid: &Hash32, output: &TxOut) -> Result<(), StoreError> {
        let n = output.n.expect("output must have a position assigned before storage");
        let row = RowKey::position(n).0;
        let key = composite_key(&txid.to_hex(), &row);
        let bytes = Self::encode(CF_OUTPUT, output)?;
        let cf = self.cf(CF_OUTPUT)?;
        self.db.put_cf(cf, key, bytes).map_err(|e| StoreError::Io(e.to_string()))
    }

    fn delete_outputs(&self, txid: &Hash32) -> Result<(), StoreError> {
        let outputs = self.get_outputs(txid)?;
        let cf = self.cf(CF_OUTPUT)?;
        let mut batch = WriteBatch::default();
        for output in &outputs {
            let n = output.n.expect("stored output always has a position");
            let row = RowKey::position(n).0;
            batch.delete_cf(cf, composite_key(&txid.to_hex(), &row));
        }
        self.db.write(batch).map_err(|e| StoreError::Io(e.to_string()))
    }
}
