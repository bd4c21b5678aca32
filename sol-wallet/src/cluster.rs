//! Seam to the cluster RPC endpoint.

use async_trait::async_trait;

use crate::error::{WalletError, WalletResult};
use crate::message::Hash;

/// Blockhash source and broadcaster. The RPC implementation lives outside
/// this crate.
#[async_trait]
pub trait ClusterClient: Send + Sync {
    async fn recent_blockhash(&self) -> WalletResult<Hash>;

    /// Submit a wire-encoded transaction, returning its signature string.
    async fn send_transaction(&self, wire: &[u8]) -> WalletResult<String>;
}

/// Client for signing without network access: serves a caller-supplied
/// blockhash and refuses to broadcast.
#[derive(Debug, Clone, Copy)]
pub struct OfflineCluster {
    blockhash: Hash,
}

impl OfflineCluster {
    pub fn new(blockhash: Hash) -> Self {
        Self { blockhash }
    }
}

#[async_trait]
impl ClusterClient for OfflineCluster {
    async fn recent_blockhash(&self) -> WalletResult<Hash> {
        Ok(self.blockhash)
    }

    async fn send_transaction(&self, _wire: &[u8]) -> WalletResult<String> {
        Err(WalletError::cluster("offline: broadcast unavailable"))
    }
}
