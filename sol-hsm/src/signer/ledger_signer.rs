//! Ledger signing app client

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sol_crypto::{DerivationPath, PublicKey, Signature};
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};

use crate::apdu::{CLA, INS_GET_PUBKEY, INS_SIGN_MESSAGE, P1_CONFIRM, P1_NON_CONFIRM};
use crate::channel::DeviceConnector;
use crate::config::HsmConfig;
use crate::error::{HsmError, HsmResult, TransportError};
use crate::session::DeviceSession;
use crate::signer::HardwareSigner;

/// Number of signers in a sign request. The app accepts exactly one.
const SIGNER_COUNT: u8 = 1;

/// Hardware signer talking to the Solana app on a Ledger device.
pub struct LedgerSigner {
    connector: Arc<dyn DeviceConnector>,
    timeout: Duration,
    path: DerivationPath,
}

impl LedgerSigner {
    pub fn new(connector: Arc<dyn DeviceConnector>, config: HsmConfig) -> Self {
        Self {
            connector,
            timeout: config.interaction_timeout,
            path: config.derivation_path,
        }
    }

    /// Whether any interaction, from this signer or another one over the
    /// same device, currently holds the device.
    pub fn is_busy(&self) -> bool {
        self.connector.gate().is_busy()
    }

    pub fn interaction_timeout(&self) -> Duration {
        self.timeout
    }

    /// Public key at an explicit path.
    pub async fn get_public_key_at(&self, path: &DerivationPath) -> HsmResult<PublicKey> {
        let reply = self
            .interact(INS_GET_PUBKEY, P1_NON_CONFIRM, &path.to_bytes())
            .await?;
        let key = PublicKey::from_slice(&reply).map_err(|_| {
            HsmError::Protocol(format!("public key reply of {} bytes", reply.len()))
        })?;
        info!(target: "sol::hsm", %path, public_key = %key, "hardware public key retrieved");
        Ok(key)
    }

    /// One bounded interaction: claim the device, open a session, run the
    /// exchange and close the session again whatever the outcome.
    async fn interact(&self, ins: u8, p1: u8, payload: &[u8]) -> HsmResult<Vec<u8>> {
        let permit = self.connector.gate().try_acquire().map_err(|err| self.translate(err))?;
        let deadline = Instant::now() + self.timeout;

        let mut session =
            match timeout_at(deadline, DeviceSession::open(self.connector.as_ref(), permit)).await {
                Ok(Ok(session)) => session,
                Ok(Err(err)) => return Err(self.translate(err)),
                Err(_) => return Err(self.timed_out()),
            };

        let result = timeout_at(deadline, session.transport().send(CLA, ins, p1, payload)).await;
        session.close().await;

        match result {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(err)) => Err(self.translate(err)),
            Err(_) => Err(self.timed_out()),
        }
    }

    fn translate(&self, err: TransportError) -> HsmError {
        debug!(target: "sol::hsm", error = %err, "device transport failure");
        let err = HsmError::from(err);
        warn!(target: "sol::hsm", error = %err, "hardware signer request failed");
        err
    }

    fn timed_out(&self) -> HsmError {
        warn!(target: "sol::hsm", timeout = ?self.timeout, "device interaction timed out");
        HsmError::Timeout(self.timeout)
    }
}

#[async_trait]
impl HardwareSigner for LedgerSigner {
    fn derivation_path(&self) -> &DerivationPath {
        &self.path
    }

    async fn get_public_key(&self) -> HsmResult<PublicKey> {
        self.get_public_key_at(&self.path).await
    }

    async fn sign_transaction(&self, path: &DerivationPath, message: &[u8]) -> HsmResult<Signature> {
        let path_bytes = path.to_bytes();
        let mut payload = Vec::with_capacity(1 + path_bytes.len() + message.len());
        payload.push(SIGNER_COUNT);
        payload.extend_from_slice(&path_bytes);
        payload.extend_from_slice(message);

        debug!(target: "sol::hsm", %path, message_len = message.len(), "requesting device signature");
        let reply = self.interact(INS_SIGN_MESSAGE, P1_CONFIRM, &payload).await?;
        Signature::from_slice(&reply)
            .map_err(|_| HsmError::Protocol(format!("signature reply of {} bytes", reply.len())))
    }
}
