//! Hardware signer configuration

use std::time::Duration;

use sol_crypto::DerivationPath;

/// Default bound on a single device interaction
pub const INTERACTION_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone)]
pub struct HsmConfig {
    /// Deadline covering session open and every exchange of one interaction
    pub interaction_timeout: Duration,

    /// Index among connected devices (0 for the first)
    pub device_index: usize,

    /// Path of the hardware account
    pub derivation_path: DerivationPath,
}

impl Default for HsmConfig {
    fn default() -> Self {
        Self {
            interaction_timeout: INTERACTION_TIMEOUT,
            device_index: 0,
            derivation_path: DerivationPath::root(),
        }
    }
}
