//! Ledger HID report framing.
//!
//! An APDU travels in 64-byte reports. Each report starts with the channel id
//! (2 bytes), the APDU tag and a big-endian sequence index. The first report
//! of a message also carries the total message length (2 bytes). Unused bytes
//! are zero padded.

use byteorder::{BigEndian, ByteOrder};

use crate::error::TransportError;

pub const HID_PACKET_SIZE: usize = 64;

const CHANNEL: u16 = 0x0101;
const TAG_APDU: u8 = 0x05;
const HEADER_SIZE: usize = 5;
const LENGTH_SIZE: usize = 2;

/// Split an encoded APDU into HID reports.
pub fn wrap_command(message: &[u8]) -> Vec<[u8; HID_PACKET_SIZE]> {
    let mut reports = Vec::new();
    let mut offset = 0usize;
    let mut sequence = 0u16;

    loop {
        let mut report = [0u8; HID_PACKET_SIZE];
        BigEndian::write_u16(&mut report[0..2], CHANNEL);
        report[2] = TAG_APDU;
        BigEndian::write_u16(&mut report[3..5], sequence);

        let mut cursor = HEADER_SIZE;
        if sequence == 0 {
            BigEndian::write_u16(&mut report[cursor..cursor + LENGTH_SIZE], message.len() as u16);
            cursor += LENGTH_SIZE;
        }

        let take = (HID_PACKET_SIZE - cursor).min(message.len() - offset);
        report[cursor..cursor + take].copy_from_slice(&message[offset..offset + take]);
        offset += take;
        reports.push(report);

        if offset >= message.len() {
            break;
        }
        sequence = sequence.wrapping_add(1);
    }

    reports
}

/// Reassembles a reply from consecutive HID reports.
#[derive(Debug, Default)]
pub struct ResponseAssembler {
    expected: Option<usize>,
    sequence: u16,
    data: Vec<u8>,
}

impl ResponseAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one report. Returns the full reply once all bytes arrived.
    pub fn push(&mut self, report: &[u8]) -> Result<Option<Vec<u8>>, TransportError> {
        if report.len() < HEADER_SIZE {
            return Err(TransportError::Framing(format!(
                "report of {} bytes is shorter than its header",
                report.len()
            )));
        }
        let channel = BigEndian::read_u16(&report[0..2]);
        if channel != CHANNEL {
            return Err(TransportError::Framing(format!(
                "unexpected channel 0x{channel:04X}"
            )));
        }
        if report[2] != TAG_APDU {
            return Err(TransportError::Framing(format!(
                "unexpected tag 0x{:02X}",
                report[2]
            )));
        }
        let sequence = BigEndian::read_u16(&report[3..5]);
        if sequence != self.sequence {
            return Err(TransportError::Framing(format!(
                "expected sequence {}, got {}",
                self.sequence, sequence
            )));
        }

        let mut cursor = HEADER_SIZE;
        let expected = match self.expected {
            Some(expected) => expected,
            None => {
                if report.len() < HEADER_SIZE + LENGTH_SIZE {
                    return Err(TransportError::Framing("missing length field".to_string()));
                }
                let expected = BigEndian::read_u16(&report[cursor..cursor + LENGTH_SIZE]) as usize;
                cursor += LENGTH_SIZE;
                self.expected = Some(expected);
                expected
            }
        };

        let take = (expected - self.data.len()).min(report.len() - cursor);
        self.data.extend_from_slice(&report[cursor..cursor + take]);
        self.sequence = self.sequence.wrapping_add(1);

        if self.data.len() == expected {
            Ok(Some(std::mem::take(&mut self.data)))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reassemble(reports: &[[u8; HID_PACKET_SIZE]]) -> Vec<u8> {
        let mut assembler = ResponseAssembler::new();
        for (i, report) in reports.iter().enumerate() {
            if let Some(reply) = assembler.push(report).unwrap() {
                assert_eq!(i, reports.len() - 1);
                return reply;
            }
        }
        panic!("reply incomplete");
    }

    #[test]
    fn short_message_fits_one_report() {
        let reports = wrap_command(&[0xE0, 0x05, 0x00, 0x00, 0x00]);
        assert_eq!(reports.len(), 1);
        assert_eq!(&reports[0][..7], &[0x01, 0x01, 0x05, 0x00, 0x00, 0x00, 0x05]);
        assert_eq!(&reports[0][7..12], &[0xE0, 0x05, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn full_apdu_spans_reports_and_round_trips() {
        let message: Vec<u8> = (0..260u16).map(|i| i as u8).collect();
        let reports = wrap_command(&message);
        // 57 bytes in the first report, 59 in each after
        assert_eq!(reports.len(), 5);
        assert_eq!(BigEndian::read_u16(&reports[4][3..5]), 4);
        assert_eq!(reassemble(&reports), message);
    }

    #[test]
    fn rejects_out_of_order_report() {
        let reports = wrap_command(&[0u8; 100]);
        let mut assembler = ResponseAssembler::new();
        assert!(matches!(
            assembler.push(&reports[1]),
            Err(TransportError::Framing(_))
        ));
    }

    #[test]
    fn rejects_foreign_channel() {
        let mut report = wrap_command(&[0x90, 0x00])[0];
        report[1] = 0x02;
        assert!(ResponseAssembler::new().push(&report).is_err());
    }
}
