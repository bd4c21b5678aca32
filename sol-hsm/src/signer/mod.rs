//! Hardware signer abstraction

mod hardware_signer;
mod ledger_signer;

pub use hardware_signer::HardwareSigner;
pub use ledger_signer::LedgerSigner;
