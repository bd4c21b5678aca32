//! Ledger USB HID connector

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use hidapi::{HidApi, HidDevice};
use parking_lot::Mutex;
use tracing::debug;

use crate::apdu::Apdu;
use crate::channel::{DeviceChannel, DeviceConnector};
use crate::error::TransportError;
use crate::session::SessionGate;
use crate::hid::{wrap_command, ResponseAssembler, HID_PACKET_SIZE};

/// Ledger USB Vendor ID
const LEDGER_VENDOR_ID: u16 = 0x2c97;

/// Read poll interval; the closed flag is checked between polls.
const READ_POLL_MS: i32 = 250;

/// Gates of the physical devices, shared by every connector in the process.
fn device_gate(device_index: usize) -> SessionGate {
    static GATES: OnceLock<Mutex<HashMap<usize, SessionGate>>> = OnceLock::new();
    GATES
        .get_or_init(Default::default)
        .lock()
        .entry(device_index)
        .or_default()
        .clone()
}

/// Opens HID channels to the n-th connected Ledger.
pub struct HidConnector {
    device_index: usize,
    gate: SessionGate,
}

impl HidConnector {
    pub fn new(device_index: usize) -> Self {
        Self {
            device_index,
            gate: device_gate(device_index),
        }
    }

    fn open_blocking(index: usize) -> Result<HidDevice, TransportError> {
        let api = HidApi::new().map_err(|e| TransportError::channel(format!("Not supported: {e}")))?;
        let devices: Vec<_> = api
            .device_list()
            .filter(|d| d.vendor_id() == LEDGER_VENDOR_ID)
            .collect();

        if devices.is_empty() {
            return Err(TransportError::channel("No device found"));
        }
        let info = devices.get(index).ok_or_else(|| {
            TransportError::channel(format!(
                "Device not found at index {index}, {} connected",
                devices.len()
            ))
        })?;

        debug!(
            target: "sol::hsm",
            product = info.product_string().unwrap_or("Ledger"),
            "opening ledger hid device"
        );
        info.open_device(&api)
            .map_err(|e| TransportError::channel(format!("Unable to claim interface: {e}")))
    }
}

#[async_trait]
impl DeviceConnector for HidConnector {
    async fn open(&self) -> Result<Box<dyn DeviceChannel>, TransportError> {
        let index = self.device_index;
        let device = tokio::task::spawn_blocking(move || Self::open_blocking(index))
            .await
            .map_err(|e| TransportError::channel(format!("hid worker failed: {e}")))??;

        Ok(Box::new(HidChannel {
            device: Arc::new(Mutex::new(device)),
            closed: Arc::new(AtomicBool::new(false)),
        }))
    }

    fn gate(&self) -> &SessionGate {
        &self.gate
    }

    fn describe(&self) -> String {
        format!("ledger #{}", self.device_index)
    }
}

struct HidChannel {
    device: Arc<Mutex<HidDevice>>,
    closed: Arc<AtomicBool>,
}

fn exchange_blocking(
    device: &HidDevice,
    closed: &AtomicBool,
    command: &[u8],
) -> Result<Vec<u8>, TransportError> {
    for report in wrap_command(command) {
        let mut buffer = Vec::with_capacity(HID_PACKET_SIZE + 1);
        // report id
        buffer.push(0x00);
        buffer.extend_from_slice(&report);
        device
            .write(&buffer)
            .map_err(|e| TransportError::channel(format!("hid write failed: {e}")))?;
    }

    let mut assembler = ResponseAssembler::new();
    let mut report = [0u8; HID_PACKET_SIZE];
    loop {
        if closed.load(Ordering::Acquire) {
            return Err(TransportError::Closed);
        }
        let read = device
            .read_timeout(&mut report, READ_POLL_MS)
            .map_err(|e| TransportError::channel(format!("hid read failed: {e}")))?;
        if read == 0 {
            continue;
        }
        if let Some(reply) = assembler.push(&report[..read])? {
            return Ok(reply);
        }
    }
}

#[async_trait]
impl DeviceChannel for HidChannel {
    async fn exchange(&mut self, apdu: &Apdu) -> Result<Vec<u8>, TransportError> {
        let device = self.device.clone();
        let closed = self.closed.clone();
        let command = apdu.to_bytes()?;
        tokio::task::spawn_blocking(move || exchange_blocking(&device.lock(), &closed, &command))
            .await
            .map_err(|e| TransportError::channel(format!("hid worker failed: {e}")))?
    }

    async fn close(&mut self) {
        self.closed.store(true, Ordering::Release);
    }
}

impl Drop for HidChannel {
    fn drop(&mut self) {
        self.closed.store(true, Ordering::Release);
    }
}
