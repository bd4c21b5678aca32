//! Select command - switches the active account

use super::{format_account, CommandContext, CommandResult};

pub fn execute(ctx: &mut CommandContext, index: usize) -> CommandResult {
    ctx.unlock()?;
    let selected = ctx.session.select(index)?;
    let accounts = ctx.session.accounts()?;
    let account = accounts
        .iter()
        .find(|account| account.index == selected)
        .map(|account| format_account(account, selected))
        .unwrap_or_default();
    Ok(account)
}
