//! Create command - generates a new recovery phrase and seed record

use anyhow::Context;
use sol_crypto::mnemonic::WordCount;

use super::{CommandContext, CommandResult};

pub fn execute(ctx: &mut CommandContext, words: usize) -> CommandResult {
    let words = WordCount::try_from(words)?;
    if ctx.session.vault.has_record()? {
        eprintln!("An existing wallet will be replaced.");
    }
    let password = ctx.passwords.read_new()?;
    let phrase = ctx.session.vault.generate(words, &password)?;
    let accounts = ctx.session.accounts().context("listing accounts")?;

    let mut out = String::from("Wallet created. Write down your recovery phrase:\n\n");
    out.push_str(&phrase);
    out.push_str("\n\n");
    if let Some(first) = accounts.first() {
        out.push_str(&format!("Account 0: {}", first.public_key));
    }
    Ok(out)
}
