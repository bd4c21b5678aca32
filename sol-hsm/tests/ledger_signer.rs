//! LedgerSigner against the simulated device.

use std::sync::Arc;
use std::time::Duration;

use sol_crypto::{derive_public_key, DerivationPath};
use sol_hsm::apdu::{P2_EXTEND, P2_MORE};
use sol_hsm::{Fault, HardwareSigner, HsmConfig, HsmError, LedgerSigner, SimulatedDevice};

const SEED: [u8; 64] = [0x5A; 64];

fn signer_for(device: &SimulatedDevice, timeout: Duration) -> LedgerSigner {
    let config = HsmConfig {
        interaction_timeout: timeout,
        ..HsmConfig::default()
    };
    LedgerSigner::new(Arc::new(device.clone()), config)
}

#[tokio::test]
async fn public_key_comes_from_default_path() {
    let device = SimulatedDevice::new(&SEED);
    let signer = signer_for(&device, Duration::from_secs(5));

    let key = signer.get_public_key().await.unwrap();

    let expected = derive_public_key(&SEED, &"m/44'/501'".parse().unwrap()).unwrap();
    assert_eq!(key, expected);
    assert_eq!(device.open_count(), 1);
    assert_eq!(device.close_count(), 1);
}

#[tokio::test]
async fn long_message_is_chunked_and_signed() {
    let device = SimulatedDevice::new(&SEED);
    let signer = signer_for(&device, Duration::from_secs(5));
    let path = DerivationPath::for_account(2).unwrap();
    let message: Vec<u8> = (0..600u32).map(|i| (i % 251) as u8).collect();

    let signature = signer.sign_transaction(&path, &message).await.unwrap();

    let key = derive_public_key(&SEED, &path).unwrap();
    assert!(signature.verify(&key, &message));

    // 1 + 17 + 600 payload bytes
    let flags: Vec<u8> = device.exchanges().iter().map(|apdu| apdu.p2).collect();
    assert_eq!(flags, vec![P2_MORE, P2_MORE | P2_EXTEND, P2_EXTEND]);
    assert_eq!(device.close_count(), 1);
}

#[tokio::test]
async fn payload_on_continuation_is_a_protocol_error() {
    let device = SimulatedDevice::new(&SEED)
        .with_fault(Fault::ContinuationReply(vec![0xDE, 0xAD, 0xBE, 0x90, 0x00]));
    let signer = signer_for(&device, Duration::from_secs(5));

    let err = signer
        .sign_transaction(signer.derivation_path(), &[0u8; 400])
        .await
        .unwrap_err();

    assert!(matches!(err, HsmError::Protocol(_)));
    assert_eq!(device.exchanges().len(), 1);
    assert_eq!(device.close_count(), 1);
}

#[tokio::test]
async fn stalled_device_times_out_and_session_closes() {
    let device = SimulatedDevice::new(&SEED).with_fault(Fault::Stall);
    let signer = signer_for(&device, Duration::from_millis(50));

    let err = signer.get_public_key().await.unwrap_err();

    assert_eq!(err, HsmError::Timeout(Duration::from_millis(50)));
    assert_eq!(device.close_count(), 1);
    assert!(!signer.is_busy());
}

#[tokio::test]
async fn concurrent_interaction_fails_fast() {
    let device = SimulatedDevice::new(&SEED).with_fault(Fault::Stall);
    let signer = Arc::new(signer_for(&device, Duration::from_secs(60)));

    let first = {
        let signer = signer.clone();
        tokio::spawn(async move { signer.get_public_key().await })
    };
    while !signer.is_busy() {
        tokio::task::yield_now().await;
    }

    let err = signer.get_public_key().await.unwrap_err();
    assert_eq!(err, HsmError::InterfaceClaimed);
    assert_eq!(device.open_count(), 1);

    first.abort();
    assert!(first.await.unwrap_err().is_cancelled());
    assert!(!signer.is_busy());
    assert_eq!(device.close_count(), 1);
}

#[tokio::test]
async fn second_signer_on_same_device_fails_fast() {
    let device = SimulatedDevice::new(&SEED).with_fault(Fault::Stall);
    let first_signer = Arc::new(signer_for(&device, Duration::from_secs(60)));
    let second_signer = signer_for(&device, Duration::from_secs(60));

    let first = {
        let signer = first_signer.clone();
        tokio::spawn(async move { signer.get_public_key().await })
    };
    while !first_signer.is_busy() {
        tokio::task::yield_now().await;
    }
    assert!(second_signer.is_busy());

    let err = tokio::time::timeout(Duration::from_secs(1), second_signer.get_public_key())
        .await
        .expect("second request must not queue behind the first")
        .unwrap_err();
    assert_eq!(err, HsmError::InterfaceClaimed);
    assert_eq!(device.open_count(), 1);

    first.abort();
    assert!(first.await.unwrap_err().is_cancelled());
    assert!(!second_signer.is_busy());

    device.set_fault(None);
    assert!(second_signer.get_public_key().await.is_ok());
    assert_eq!(device.open_count(), 2);
}

#[tokio::test]
async fn rejection_on_device_is_reported() {
    let device = SimulatedDevice::new(&SEED).with_fault(Fault::Reject);
    let signer = signer_for(&device, Duration::from_secs(5));

    let err = signer
        .sign_transaction(signer.derivation_path(), b"transfer")
        .await
        .unwrap_err();
    assert_eq!(err, HsmError::UserRejected);

    // public key requests need no confirmation
    assert!(signer.get_public_key().await.is_ok());
}

#[tokio::test]
async fn platform_diagnostics_are_translated() {
    let cases = [
        ("No WebUSB interface found for your Ledger device.", HsmError::DeviceNotFound),
        ("Unable to claim interface.", HsmError::InterfaceClaimed),
        ("Not supported", HsmError::PlatformUnsupported),
        ("No device selected.", HsmError::NoDeviceSelected),
        ("transfer error: LIBUSB_ERROR_IO", HsmError::LockedOrUnknown),
    ];

    for (diagnostic, expected) in cases {
        let device = SimulatedDevice::new(&SEED).with_fault(Fault::OpenError(diagnostic.to_string()));
        let signer = signer_for(&device, Duration::from_secs(5));
        assert_eq!(signer.get_public_key().await.unwrap_err(), expected);
        assert!(!signer.is_busy());
    }
}
