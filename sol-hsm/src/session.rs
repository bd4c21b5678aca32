//! Scoped device sessions.
//!
//! A device exposes one physical interface, so at most one session may be
//! open per device. A second open attempt fails immediately with
//! [`TransportError::InterfaceBusy`] instead of queueing.

use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use crate::channel::DeviceConnector;
use crate::error::TransportError;
use crate::transport::DeviceTransport;

/// Single-flight guard shared by everything talking to one device.
#[derive(Debug, Clone, Default)]
pub struct SessionGate {
    slot: Arc<Mutex<()>>,
}

/// Proof that the holder owns the device interface.
#[derive(Debug)]
pub struct SessionPermit {
    _guard: OwnedMutexGuard<()>,
}

impl SessionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the interface or fail at once.
    pub fn try_acquire(&self) -> Result<SessionPermit, TransportError> {
        self.slot
            .clone()
            .try_lock_owned()
            .map(|guard| SessionPermit { _guard: guard })
            .map_err(|_| TransportError::InterfaceBusy)
    }

    pub fn is_busy(&self) -> bool {
        self.slot.try_lock().is_err()
    }
}

/// An open channel plus the permit that makes it exclusive.
///
/// Call [`DeviceSession::close`] on every exit path. If a session is dropped
/// without closing (for example when the surrounding future is cancelled),
/// the channel and the permit are still released by their destructors.
pub struct DeviceSession {
    transport: DeviceTransport,
    _permit: SessionPermit,
}

impl DeviceSession {
    pub async fn open(
        connector: &dyn DeviceConnector,
        permit: SessionPermit,
    ) -> Result<Self, TransportError> {
        let channel = connector.open().await?;
        debug!(target: "sol::hsm", device = %connector.describe(), "device session opened");
        Ok(Self {
            transport: DeviceTransport::new(channel),
            _permit: permit,
        })
    }

    pub fn transport(&mut self) -> &mut DeviceTransport {
        &mut self.transport
    }

    /// Close the channel, then release the interface.
    pub async fn close(self) {
        let DeviceSession {
            transport,
            _permit: permit,
        } = self;
        transport.close().await;
        debug!(target: "sol::hsm", "device session closed");
        drop(permit);
    }
}
