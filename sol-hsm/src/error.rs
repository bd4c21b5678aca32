//! HSM Error types
//!
//! Two layers: [`TransportError`] carries what the channel and protocol
//! framing report, including raw platform diagnostics. [`HsmError`] is the
//! closed set surfaced past the signer boundary; raw diagnostics never leak
//! through it.

use std::time::Duration;

use thiserror::Error;

use crate::apdu::{SW_CONDITIONS_NOT_SATISFIED, SW_OK};

/// Result type for HSM operations
pub type HsmResult<T> = std::result::Result<T, HsmError>;

/// Errors from the device channel and the chunked APDU protocol.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Diagnostic string from the platform USB/HID layer
    #[error("{0}")]
    Channel(String),

    /// Another session holds the device interface
    #[error("interface already in use")]
    InterfaceBusy,

    /// A continuation exchange answered with data instead of a bare status word
    #[error("received unexpected reply payload ({len} bytes)")]
    UnexpectedReplyPayload { len: usize },

    /// Reply too short to carry a status word
    #[error("reply too short ({len} bytes)")]
    ReplyTooShort { len: usize },

    /// Device answered with a status word other than 0x9000
    #[error("device returned status 0x{0:04X}")]
    Status(u16),

    /// APDU data field longer than the one-byte length can express
    #[error("apdu data of {len} bytes exceeds the single exchange limit")]
    PayloadTooLarge { len: usize },

    /// HID report framing violated
    #[error("hid framing: {0}")]
    Framing(String),

    /// Session was closed while an exchange was outstanding
    #[error("session closed")]
    Closed,
}

impl TransportError {
    pub fn channel(message: impl Into<String>) -> Self {
        TransportError::Channel(message.into())
    }

    /// Framing and reply-shape violations, as opposed to device conditions.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            TransportError::UnexpectedReplyPayload { .. }
                | TransportError::ReplyTooShort { .. }
                | TransportError::PayloadTooLarge { .. }
                | TransportError::Framing(_)
        )
    }
}

/// User-facing hardware signer failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HsmError {
    /// No usable device: absent or firmware too old to expose the interface
    #[error("Device not found")]
    DeviceNotFound,

    /// Interface claimed by another session
    #[error("Device interface already claimed")]
    InterfaceClaimed,

    /// Platform has no supported transport
    #[error("Transport not supported on this platform")]
    PlatformUnsupported,

    /// User dismissed the device picker
    #[error("No device selected")]
    NoDeviceSelected,

    /// User rejected the request on the device
    #[error("User rejected operation")]
    UserRejected,

    /// Chunked protocol or reply-shape violation
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Interaction exceeded its deadline
    #[error("Device timeout after {0:?}")]
    Timeout(Duration),

    /// Anything else; usually a locked device or the app not being open
    #[error("Device locked or unknown error")]
    LockedOrUnknown,

    /// Feature not enabled at compile time
    #[error("Feature not enabled: {0}")]
    FeatureNotEnabled(String),
}

impl HsmError {
    /// Text shown to the user for each cause.
    pub fn user_message(&self) -> &'static str {
        match self {
            HsmError::DeviceNotFound => {
                "Couldn't connect to a Ledger. Please upgrade the Ledger firmware to version 1.5.5 or later."
            }
            HsmError::InterfaceClaimed => {
                "Could not access Ledger device. Is it being used in another window?"
            }
            HsmError::PlatformUnsupported => {
                "This platform doesn't seem to support USB access to the Ledger. Try updating it to the latest version."
            }
            HsmError::NoDeviceSelected => {
                "You did not select a Ledger device. Check if the Ledger is plugged in and unlocked."
            }
            HsmError::UserRejected => "The request was rejected on the Ledger device.",
            HsmError::Protocol(_) => {
                "The Ledger device sent an unexpected reply. Reconnect it and try again."
            }
            HsmError::Timeout(_) => {
                "The Ledger device did not respond in time. Check that it is unlocked and try again."
            }
            HsmError::LockedOrUnknown => "Unknown Error. Check if the Ledger is unlocked.",
            HsmError::FeatureNotEnabled(_) => "Ledger support is not enabled in this build.",
        }
    }
}

/// Map a platform diagnostic onto the closed cause set by its prefix.
fn classify_diagnostic(message: &str) -> HsmError {
    let message = message.trim();
    let starts = |prefix: &str| {
        message
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    };

    if starts("No WebUSB interface found") || starts("No device found") || starts("Device not found") {
        HsmError::DeviceNotFound
    } else if starts("Unable to claim interface") {
        HsmError::InterfaceClaimed
    } else if starts("Not supported") {
        HsmError::PlatformUnsupported
    } else if starts("No device selected") {
        HsmError::NoDeviceSelected
    } else {
        HsmError::LockedOrUnknown
    }
}

impl From<TransportError> for HsmError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Channel(message) => classify_diagnostic(&message),
            TransportError::InterfaceBusy => HsmError::InterfaceClaimed,
            TransportError::Status(SW_CONDITIONS_NOT_SATISFIED) => HsmError::UserRejected,
            TransportError::Status(sw) if sw == SW_OK => {
                HsmError::Protocol("success status reported as failure".to_string())
            }
            TransportError::Status(_) | TransportError::Closed => HsmError::LockedOrUnknown,
            err @ (TransportError::UnexpectedReplyPayload { .. }
            | TransportError::ReplyTooShort { .. }
            | TransportError::PayloadTooLarge { .. }
            | TransportError::Framing(_)) => HsmError::Protocol(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_map_to_causes() {
        let cases = [
            (
                "No WebUSB interface found for your Ledger device.",
                HsmError::DeviceNotFound,
            ),
            ("  Unable to claim interface.", HsmError::InterfaceClaimed),
            ("Not supported", HsmError::PlatformUnsupported),
            ("No device selected.", HsmError::NoDeviceSelected),
            ("LIBUSB_ERROR_PIPE", HsmError::LockedOrUnknown),
            ("", HsmError::LockedOrUnknown),
        ];
        for (message, expected) in cases {
            assert_eq!(HsmError::from(TransportError::channel(message)), expected);
        }
    }

    #[test]
    fn status_words_map_to_causes() {
        assert_eq!(
            HsmError::from(TransportError::Status(0x6985)),
            HsmError::UserRejected
        );
        assert_eq!(
            HsmError::from(TransportError::Status(0x6E00)),
            HsmError::LockedOrUnknown
        );
    }

    #[test]
    fn framing_violations_are_protocol_errors() {
        let err = HsmError::from(TransportError::UnexpectedReplyPayload { len: 5 });
        assert!(matches!(err, HsmError::Protocol(_)));
        assert!(TransportError::ReplyTooShort { len: 1 }.is_protocol_violation());
        assert!(!TransportError::InterfaceBusy.is_protocol_violation());
    }

    #[test]
    fn raw_diagnostics_do_not_leak() {
        let err = HsmError::from(TransportError::channel("hid_write: errno 19 at /dev/hidraw3"));
        assert!(!err.to_string().contains("hidraw"));
        assert!(!err.user_message().contains("hidraw"));
    }
}
