//! ShowMnemonic command - prints the recovery phrase

use super::{CommandContext, CommandResult};

pub fn execute(ctx: &CommandContext) -> CommandResult {
    ctx.unlock()?;
    let phrase = ctx.session.vault.mnemonic()?;
    Ok(phrase.to_string())
}
