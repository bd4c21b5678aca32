//! Command APDUs and the signing app's protocol constants.

use crate::error::TransportError;

/// Instruction class of the signing app
pub const CLA: u8 = 0xE0;

/// Signing app instructions
pub const INS_GET_PUBKEY: u8 = 0x05;
pub const INS_SIGN_MESSAGE: u8 = 0x06;

/// P1: whether the device asks the user to confirm
pub const P1_NON_CONFIRM: u8 = 0x00;
pub const P1_CONFIRM: u8 = 0x01;

/// P2 flag: this chunk continues a payload started by an earlier chunk
pub const P2_EXTEND: u8 = 0x01;
/// P2 flag: more chunks follow this one
pub const P2_MORE: u8 = 0x02;

/// Largest data field of a single exchange
pub const MAX_PAYLOAD: usize = 255;

/// Status words
pub const SW_OK: u16 = 0x9000;
pub const SW_CONDITIONS_NOT_SATISFIED: u16 = 0x6985;
pub const SW_INS_NOT_SUPPORTED: u16 = 0x6D00;
pub const SW_WRONG_DATA: u16 = 0x6A80;

/// One command exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Apdu {
    pub cla: u8,
    pub ins: u8,
    pub p1: u8,
    pub p2: u8,
    pub data: Vec<u8>,
}

impl Apdu {
    pub fn new(cla: u8, ins: u8, p1: u8, p2: u8, data: impl Into<Vec<u8>>) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            data: data.into(),
        }
    }

    /// Short-form encoding: header, one length byte, data.
    ///
    /// A data field above [`MAX_PAYLOAD`] does not fit the length byte and
    /// must go through [`DeviceTransport`](crate::DeviceTransport) chunking.
    pub fn to_bytes(&self) -> Result<Vec<u8>, TransportError> {
        let len = u8::try_from(self.data.len())
            .map_err(|_| TransportError::PayloadTooLarge { len: self.data.len() })?;
        let mut bytes = Vec::with_capacity(5 + self.data.len());
        bytes.extend_from_slice(&[self.cla, self.ins, self.p1, self.p2]);
        bytes.push(len);
        bytes.extend_from_slice(&self.data);
        Ok(bytes)
    }

    /// Parse the short-form encoding produced by [`Apdu::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 4 {
            return None;
        }
        let (header, rest) = bytes.split_at(4);
        let (&lc, data) = match rest.split_first() {
            Some(split) => split,
            None => (&0, rest),
        };
        if data.len() != lc as usize {
            return None;
        }
        Some(Self::new(header[0], header[1], header[2], header[3], data))
    }

    pub fn has_more(&self) -> bool {
        self.p2 & P2_MORE != 0
    }

    pub fn is_extension(&self) -> bool {
        self.p2 & P2_EXTEND != 0
    }
}

/// Split a reply into payload and trailing status word.
pub fn split_status(reply: &[u8]) -> Option<(&[u8], u16)> {
    let body_len = reply.len().checked_sub(2)?;
    let (body, sw) = reply.split_at(body_len);
    Some((body, u16::from_be_bytes([sw[0], sw[1]])))
}

/// Bare status word reply.
pub fn status_reply(sw: u16) -> Vec<u8> {
    sw.to_be_bytes().to_vec()
}
