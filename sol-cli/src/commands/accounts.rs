//! Accounts command - lists local and hardware accounts

use super::{format_account, CommandContext, CommandResult};

pub fn execute(ctx: &CommandContext) -> CommandResult {
    ctx.unlock()?;
    let selected = ctx.session.registry.selected();
    let lines: Vec<String> = ctx
        .session
        .accounts()?
        .iter()
        .map(|account| format_account(account, selected))
        .collect();
    Ok(lines.join("\n"))
}
