//! sol-wallet command line

mod args;
mod commands;
mod logging;
mod password;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use sol_config::{StorageBackend, WalletConfig};
use sol_store::{MemoryStore, SledStore, Store};
use sol_wallet::{WalletError, WalletSession};
use tracing::debug;

use crate::args::{Cli, Command};
use crate::commands::{CommandContext, CommandResult};
use crate::password::PasswordSource;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {}", describe(&err));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> CommandResult {
    let config_path = cli.config.unwrap_or_else(WalletConfig::default_path);
    let config = WalletConfig::load_or_default(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    logging::init_logging(&config.logging)?;

    let store = open_store(&config)?;
    let session = WalletSession::open(store, config.to_scrypt_params())?;
    let mut ctx = CommandContext {
        session,
        config,
        passwords: PasswordSource::new(cli.password_env),
    };

    debug!(command = ?cli.command, "dispatching");
    match cli.command {
        Command::Create { words } => commands::create::execute(&mut ctx, words),
        Command::Restore => commands::restore::execute(&mut ctx),
        Command::Accounts => commands::accounts::execute(&ctx),
        Command::Select { index } => commands::select::execute(&mut ctx, index),
        Command::LedgerConnect => commands::ledger::execute(&mut ctx).await,
        Command::ShowMnemonic => commands::show_mnemonic::execute(&ctx),
        Command::Transfer {
            to,
            lamports,
            blockhash,
        } => commands::transfer::execute(&mut ctx, &to, lamports, &blockhash).await,
    }
}

fn open_store(config: &WalletConfig) -> Result<Arc<dyn Store>> {
    Ok(match config.storage.backend {
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        StorageBackend::Sled => {
            let path = &config.storage.path;
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            Arc::new(
                SledStore::open(path).with_context(|| format!("opening {}", path.display()))?,
            )
        }
    })
}

/// Device failures are shown with their user-facing wording.
fn describe(err: &anyhow::Error) -> String {
    let hsm = err.chain().find_map(|cause| {
        cause
            .downcast_ref::<sol_hsm::HsmError>()
            .or_else(|| match cause.downcast_ref::<WalletError>() {
                Some(WalletError::Hsm(e)) => Some(e),
                _ => None,
            })
    });
    match hsm {
        Some(e) => e.user_message().to_string(),
        None => format!("{err:#}"),
    }
}
