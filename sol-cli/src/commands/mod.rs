//! CLI command implementations
//!
//! Each submodule implements one subcommand against an open
//! [`CommandContext`] and returns the text to print.

pub mod accounts;
pub mod create;
pub mod ledger;
pub mod restore;
pub mod select;
pub mod show_mnemonic;
pub mod transfer;

use anyhow::{bail, Result};
use sol_config::WalletConfig;
use sol_wallet::{AccountKind, WalletAccount, WalletError, WalletSession};

use crate::password::PasswordSource;

/// Common result type for CLI commands
pub type CommandResult = Result<String>;

pub struct CommandContext {
    pub session: WalletSession,
    pub config: WalletConfig,
    pub passwords: PasswordSource,
}

impl CommandContext {
    /// Unlock the vault with the user's password.
    pub fn unlock(&self) -> Result<()> {
        if !self.session.vault.has_record()? {
            bail!("no wallet found; run `sol-wallet create` or `sol-wallet restore` first");
        }
        let password = self.passwords.read("Password")?;
        match self.session.vault.unlock(&password) {
            Err(WalletError::WrongPassword) => bail!("incorrect password"),
            other => Ok(other?),
        }
    }
}

pub(crate) fn format_account(account: &WalletAccount, selected: usize) -> String {
    let marker = if account.index == selected { '*' } else { ' ' };
    let kind = match account.kind {
        AccountKind::Local => "local ",
        AccountKind::Hardware => "ledger",
    };
    format!("{marker} {:>2}  {kind}  {}", account.index, account.public_key)
}
