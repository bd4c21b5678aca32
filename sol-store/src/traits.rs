use std::fmt;

use crate::error::StoreError;

/// Named identifier for a column family.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct ColumnId(pub &'static str);

impl ColumnId {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    #[inline]
    pub const fn name(self) -> &'static str {
        self.0
    }
}

impl From<&'static str> for ColumnId {
    #[inline]
    fn from(value: &'static str) -> Self {
        ColumnId::new(value)
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Operation to be applied via a write batch.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum BatchOp {
    Put {
        column: ColumnId,
        key: Vec<u8>,
        value: Vec<u8>,
    },
    Delete {
        column: ColumnId,
        key: Vec<u8>,
    },
}

/// Ordered set of operations that should be applied atomically.
#[derive(Debug, Default, Clone)]
pub struct WriteBatch {
    ops: Vec<BatchOp>,
}

impl WriteBatch {
    #[inline]
    pub fn new() -> Self {
        Self { ops: Vec::new() }
    }

    #[inline]
    pub fn put(&mut self, column: ColumnId, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.ops.push(BatchOp::Put {
            column,
            key: key.into(),
            value: value.into(),
        });
    }

    #[inline]
    pub fn delete(&mut self, column: ColumnId, key: impl Into<Vec<u8>>) {
        self.ops.push(BatchOp::Delete {
            column,
            key: key.into(),
        });
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    #[inline]
    pub fn into_ops(self) -> Vec<BatchOp> {
        self.ops
    }
}

/// Abstraction exposed by storage backends.
pub trait Store: Send + Sync {
    fn get(&self, column: ColumnId, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    fn put(&self, column: ColumnId, key: Vec<u8>, value: Vec<u8>) -> Result<(), StoreError>;

    fn delete(&self, column: ColumnId, key: &[u8]) -> Result<(), StoreError>;

    fn write_batch(&self, batch: WriteBatch) -> Result<(), StoreError>;

    fn contains(&self, column: ColumnId, key: &[u8]) -> Result<bool, StoreError> {
        Ok(self.get(column, key)?.is_some())
    }
}
