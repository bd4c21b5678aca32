//! Command line arguments

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "sol-wallet",
    version,
    about = "Solana wallet with encrypted seed storage and Ledger signing"
)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, short = 'c', global = true, env = "SOL_WALLET_CONFIG")]
    pub config: Option<PathBuf>,

    /// Read the wallet password from this environment variable instead of
    /// prompting
    #[arg(long, global = true, value_name = "VAR")]
    pub password_env: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create a new wallet from a fresh recovery phrase
    Create {
        /// Number of words in the phrase (12 or 24)
        #[arg(long, default_value_t = 12, value_parser = parse_word_count)]
        words: usize,
    },

    /// Restore a wallet from an existing recovery phrase (replaces the
    /// current one)
    Restore,

    /// List accounts
    Accounts,

    /// Select an account; an index past the end adds a new one
    Select {
        index: usize,
    },

    /// Attach the Ledger's account and select it
    LedgerConnect,

    /// Print the recovery phrase
    ShowMnemonic,

    /// Sign a SOL transfer from the selected account and print the base58
    /// wire transaction
    Transfer {
        /// Destination public key
        #[arg(long)]
        to: String,

        #[arg(long)]
        lamports: u64,

        /// Recent blockhash to sign against
        #[arg(long)]
        blockhash: String,
    },
}

fn parse_word_count(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(words @ (12 | 24)) => Ok(words),
        _ => Err(format!("expected 12 or 24, got '{value}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_transfer() {
        let cli = Cli::try_parse_from([
            "sol-wallet",
            "transfer",
            "--to",
            "11111111111111111111111111111111",
            "--lamports",
            "42",
            "--blockhash",
            "11111111111111111111111111111111",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Command::Transfer {
                to: "11111111111111111111111111111111".to_string(),
                lamports: 42,
                blockhash: "11111111111111111111111111111111".to_string(),
            }
        );
    }

    #[test]
    fn create_defaults_to_twelve_words() {
        let cli = Cli::try_parse_from(["sol-wallet", "create"]).unwrap();
        assert_eq!(cli.command, Command::Create { words: 12 });
        assert!(Cli::try_parse_from(["sol-wallet", "create", "--words", "15"]).is_err());
    }

    #[test]
    fn global_password_env() {
        let cli = Cli::try_parse_from(["sol-wallet", "accounts", "--password-env", "PW"]).unwrap();
        assert_eq!(cli.password_env.as_deref(), Some("PW"));
        assert_eq!(cli.command, Command::Accounts);
    }
}
