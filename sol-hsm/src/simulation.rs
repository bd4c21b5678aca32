//! Simulated signing device.
//!
//! Speaks the signing app's chunked protocol on top of a software key tree so
//! that the transport, the signer and the wallet can be exercised without
//! hardware. Faults can be injected to reproduce device misbehavior.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use sol_crypto::{derive_keypair, derive_public_key, DerivationPath};
use tracing::trace;

use crate::apdu::{
    status_reply, Apdu, CLA, INS_GET_PUBKEY, INS_SIGN_MESSAGE, SW_CONDITIONS_NOT_SATISFIED,
    SW_INS_NOT_SUPPORTED, SW_OK, SW_WRONG_DATA,
};
use crate::channel::{DeviceChannel, DeviceConnector};
use crate::error::TransportError;
use crate::session::SessionGate;

const SW_CLA_NOT_SUPPORTED: u16 = 0x6E00;

/// Injected misbehavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// Answer every continuation chunk with these bytes instead of `9000`
    ContinuationReply(Vec<u8>),
    /// Never answer any exchange
    Stall,
    /// Refuse to open, reporting this platform diagnostic
    OpenError(String),
    /// The user rejects every signing request
    Reject,
}

#[derive(Default)]
struct DeviceState {
    fault: Option<Fault>,
    exchanges: Vec<Apdu>,
    pending: Vec<u8>,
    opens: usize,
    closes: usize,
}

/// Software device holding a root seed.
#[derive(Clone)]
pub struct SimulatedDevice {
    seed: Arc<[u8]>,
    state: Arc<Mutex<DeviceState>>,
    gate: SessionGate,
}

impl SimulatedDevice {
    pub fn new(seed: &[u8]) -> Self {
        Self {
            seed: Arc::from(seed),
            state: Arc::new(Mutex::new(DeviceState::default())),
            gate: SessionGate::new(),
        }
    }

    pub fn with_fault(self, fault: Fault) -> Self {
        self.set_fault(Some(fault));
        self
    }

    pub fn set_fault(&self, fault: Option<Fault>) {
        self.state.lock().fault = fault;
    }

    /// Every APDU received so far, in order.
    pub fn exchanges(&self) -> Vec<Apdu> {
        self.state.lock().exchanges.clone()
    }

    pub fn open_count(&self) -> usize {
        self.state.lock().opens
    }

    pub fn close_count(&self) -> usize {
        self.state.lock().closes
    }

    fn fault(&self) -> Option<Fault> {
        self.state.lock().fault.clone()
    }

    fn handle(&self, apdu: &Apdu) -> Vec<u8> {
        let mut state = self.state.lock();
        state.exchanges.push(apdu.clone());

        if apdu.cla != CLA {
            return status_reply(SW_CLA_NOT_SUPPORTED);
        }
        if !apdu.is_extension() {
            state.pending.clear();
        }
        state.pending.extend_from_slice(&apdu.data);

        if apdu.has_more() {
            return match &state.fault {
                Some(Fault::ContinuationReply(reply)) => reply.clone(),
                _ => status_reply(SW_OK),
            };
        }

        let payload = std::mem::take(&mut state.pending);
        let rejects = matches!(state.fault, Some(Fault::Reject));
        drop(state);

        trace!(target: "sol::hsm", ins = apdu.ins, len = payload.len(), "simulated device request");
        match apdu.ins {
            INS_GET_PUBKEY => self.public_key_reply(&payload),
            INS_SIGN_MESSAGE if rejects => status_reply(SW_CONDITIONS_NOT_SATISFIED),
            INS_SIGN_MESSAGE => self.signature_reply(&payload),
            _ => status_reply(SW_INS_NOT_SUPPORTED),
        }
    }

    fn public_key_reply(&self, payload: &[u8]) -> Vec<u8> {
        let key = DerivationPath::from_bytes(payload)
            .and_then(|path| derive_public_key(&self.seed, &path));
        match key {
            Ok(key) => with_ok(key.as_bytes()),
            Err(_) => status_reply(SW_WRONG_DATA),
        }
    }

    /// Payload: signer count (always 1), serialized path, message.
    fn signature_reply(&self, payload: &[u8]) -> Vec<u8> {
        let Some((&1, rest)) = payload.split_first() else {
            return status_reply(SW_WRONG_DATA);
        };
        let Some(&count) = rest.first() else {
            return status_reply(SW_WRONG_DATA);
        };
        let path_len = 1 + count as usize * 4;
        if rest.len() < path_len {
            return status_reply(SW_WRONG_DATA);
        }
        let (path, message) = rest.split_at(path_len);
        let keypair = DerivationPath::from_bytes(path)
            .and_then(|path| derive_keypair(&self.seed, &path));
        match keypair {
            Ok(keypair) => with_ok(keypair.sign(message).as_bytes()),
            Err(_) => status_reply(SW_WRONG_DATA),
        }
    }
}

fn with_ok(body: &[u8]) -> Vec<u8> {
    let mut reply = body.to_vec();
    reply.extend_from_slice(&status_reply(SW_OK));
    reply
}

#[async_trait]
impl DeviceConnector for SimulatedDevice {
    async fn open(&self) -> Result<Box<dyn DeviceChannel>, TransportError> {
        if let Some(Fault::OpenError(message)) = self.fault() {
            return Err(TransportError::channel(message));
        }
        self.state.lock().opens += 1;
        Ok(Box::new(SimulatedChannel {
            device: self.clone(),
            closed: false,
        }))
    }

    fn gate(&self) -> &SessionGate {
        &self.gate
    }

    fn describe(&self) -> String {
        "simulated device".to_string()
    }
}

struct SimulatedChannel {
    device: SimulatedDevice,
    closed: bool,
}

#[async_trait]
impl DeviceChannel for SimulatedChannel {
    async fn exchange(&mut self, apdu: &Apdu) -> Result<Vec<u8>, TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        if matches!(self.device.fault(), Some(Fault::Stall)) {
            self.device.state.lock().exchanges.push(apdu.clone());
            std::future::pending::<()>().await;
        }
        Ok(self.device.handle(apdu))
    }

    async fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.device.state.lock().closes += 1;
        }
    }
}

impl Drop for SimulatedChannel {
    fn drop(&mut self) {
        if !self.closed {
            self.device.state.lock().closes += 1;
        }
    }
}
