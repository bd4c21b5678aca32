//! Restore command - replaces the wallet with one from an existing phrase

use super::{CommandContext, CommandResult};
use crate::password::read_line;

pub fn execute(ctx: &mut CommandContext) -> CommandResult {
    let phrase = read_line("Recovery phrase")?;
    let password = ctx.passwords.read_new()?;
    ctx.session.vault.restore(&phrase, &password)?;

    let accounts = ctx.session.accounts()?;
    let first = accounts
        .first()
        .map(|account| account.public_key.to_string())
        .unwrap_or_default();
    Ok(format!("Wallet restored.\nAccount 0: {first}"))
}
