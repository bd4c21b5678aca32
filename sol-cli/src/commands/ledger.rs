//! LedgerConnect command - attaches the device account and selects it

use std::sync::Arc;

use sol_config::WalletConfig;
use sol_hsm::HardwareSigner;

use super::{format_account, CommandContext, CommandResult};

/// Open the configured Ledger.
#[cfg(feature = "ledger")]
pub fn open_device(config: &WalletConfig) -> anyhow::Result<Arc<dyn HardwareSigner>> {
    use sol_hsm::{HidConnector, LedgerSigner};

    let connector = HidConnector::new(config.device.device_index);
    Ok(Arc::new(LedgerSigner::new(
        Arc::new(connector),
        config.to_hsm_config(),
    )))
}

#[cfg(not(feature = "ledger"))]
pub fn open_device(_config: &WalletConfig) -> anyhow::Result<Arc<dyn HardwareSigner>> {
    use sol_hsm::HsmError;

    Err(HsmError::FeatureNotEnabled("ledger".to_string()).into())
}

pub async fn execute(ctx: &mut CommandContext) -> CommandResult {
    ctx.unlock()?;
    let device = open_device(&ctx.config)?;
    eprintln!("Confirm on your Ledger if prompted...");
    let key = ctx.session.connect_hardware(device).await?;

    let selected = ctx.session.registry.selected();
    let account = ctx
        .session
        .accounts()?
        .into_iter()
        .find(|account| account.public_key == key && account.index == selected)
        .map(|account| format_account(&account, selected))
        .unwrap_or_else(|| key.to_string());
    Ok(account)
}
