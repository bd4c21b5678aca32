use dashmap::DashMap;

use crate::error::StoreError;
use crate::traits::{BatchOp, ColumnId, Store, WriteBatch};

/// Volatile store for tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryStore {
    columns: DashMap<ColumnId, DashMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            columns: DashMap::new(),
        }
    }

    /// Number of keys held in `column`.
    pub fn len(&self, column: ColumnId) -> usize {
        self.columns
            .get(&column)
            .map(|col| col.value().len())
            .unwrap_or(0)
    }
}

impl Store for MemoryStore {
    fn get(&self, column: ColumnId, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        if let Some(col) = self.columns.get(&column) {
            Ok(col.value().get(key).map(|value| value.value().clone()))
        } else {
            Ok(None)
        }
    }

    fn put(&self, column: ColumnId, key: Vec<u8>, value: Vec<u8>) -> Result<(), StoreError> {
        self.columns
            .entry(column)
            .or_insert_with(DashMap::new)
            .value()
            .insert(key, value);
        Ok(())
    }

    fn delete(&self, column: ColumnId, key: &[u8]) -> Result<(), StoreError> {
        if let Some(col) = self.columns.get(&column) {
            col.value().remove(key);
        }
        Ok(())
    }

    fn write_batch(&self, batch: WriteBatch) -> Result<(), StoreError> {
        for op in batch.into_ops() {
            match op {
                BatchOp::Put { column, key, value } => {
                    self.put(column, key, value)?;
                }
                BatchOp::Delete { column, key } => {
                    self.delete(column, key.as_slice())?;
                }
            }
        }

        Ok(())
    }
}
