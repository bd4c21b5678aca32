//! Chunked instruction transport.
//!
//! Payloads above [`MAX_PAYLOAD`] are split into chunks. Every chunk but the
//! last carries `P2_MORE`; every chunk after the first carries `P2_EXTEND`.
//! A continuation exchange must answer with exactly a 2-byte status word. The
//! final reply minus its status word is the logical response.

use tracing::trace;

use crate::apdu::{split_status, Apdu, MAX_PAYLOAD, P2_EXTEND, P2_MORE, SW_OK};
use crate::channel::DeviceChannel;
use crate::error::TransportError;

/// Frames instruction payloads over an open device channel.
pub struct DeviceTransport {
    channel: Box<dyn DeviceChannel>,
}

impl DeviceTransport {
    pub fn new(channel: Box<dyn DeviceChannel>) -> Self {
        Self { channel }
    }

    /// Send `payload` for instruction `ins`, chunking as needed.
    pub async fn send(
        &mut self,
        cla: u8,
        ins: u8,
        p1: u8,
        payload: &[u8],
    ) -> Result<Vec<u8>, TransportError> {
        let mut p2 = 0u8;
        let mut offset = 0usize;

        while payload.len() - offset > MAX_PAYLOAD {
            let chunk = &payload[offset..offset + MAX_PAYLOAD];
            offset += MAX_PAYLOAD;

            let apdu = Apdu::new(cla, ins, p1, p2 | P2_MORE, chunk);
            trace!(target: "sol::hsm", ins, p2 = apdu.p2, len = chunk.len(), "send continuation chunk");
            let reply = self.channel.exchange(&apdu).await?;
            if reply.len() != 2 {
                return Err(TransportError::UnexpectedReplyPayload { len: reply.len() });
            }
            check_status(&reply)?;

            p2 |= P2_EXTEND;
        }

        let chunk = &payload[offset..];
        let apdu = Apdu::new(cla, ins, p1, p2, chunk);
        trace!(target: "sol::hsm", ins, p2, len = chunk.len(), "send final chunk");
        let reply = self.channel.exchange(&apdu).await?;
        let body_len = check_status(&reply)?;

        Ok(reply[..body_len].to_vec())
    }

    /// Release the underlying channel.
    pub async fn close(mut self) {
        self.channel.close().await;
    }
}

/// Validate the trailing status word, returning the payload length.
fn check_status(reply: &[u8]) -> Result<usize, TransportError> {
    let (body, sw) = split_status(reply).ok_or(TransportError::ReplyTooShort { len: reply.len() })?;
    if sw != SW_OK {
        return Err(TransportError::Status(sw));
    }
    Ok(body.len())
}
