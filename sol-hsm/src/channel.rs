//! Seams to the platform USB/HID layer.

use async_trait::async_trait;

use crate::apdu::Apdu;
use crate::error::TransportError;
use crate::session::SessionGate;

/// An open command channel to one device.
#[async_trait]
pub trait DeviceChannel: Send {
    /// Send one APDU and return the raw reply, status word included.
    async fn exchange(&mut self, apdu: &Apdu) -> Result<Vec<u8>, TransportError>;

    /// Release the device interface. Outstanding exchanges are abandoned.
    async fn close(&mut self);
}

/// Opens channels to a device.
#[async_trait]
pub trait DeviceConnector: Send + Sync {
    async fn open(&self) -> Result<Box<dyn DeviceChannel>, TransportError>;

    /// Single-session guard of the device behind this connector. Every
    /// connector reaching the same device must return the same gate.
    fn gate(&self) -> &SessionGate;

    /// Human-readable device description for logs.
    fn describe(&self) -> String;
}
