//! Password entry using rpassword

use std::io::{self, Write};

use anyhow::Context;
use zeroize::Zeroizing;

/// Where the wallet password comes from.
#[derive(Debug, Clone)]
pub enum PasswordSource {
    Prompt,
    Env(String),
}

impl PasswordSource {
    pub fn new(env_var: Option<String>) -> Self {
        env_var.map_or(PasswordSource::Prompt, PasswordSource::Env)
    }

    /// Read the password. An empty password is valid.
    pub fn read(&self, prompt: &str) -> anyhow::Result<Zeroizing<String>> {
        match self {
            PasswordSource::Prompt => {
                eprint!("{prompt}: ");
                io::stderr().flush()?;
                let password = rpassword::read_password().context("failed to read password")?;
                Ok(Zeroizing::new(password))
            }
            PasswordSource::Env(var) => std::env::var(var)
                .map(Zeroizing::new)
                .with_context(|| format!("environment variable {var} is not set")),
        }
    }

    /// Read a new password, asking twice when prompting.
    pub fn read_new(&self) -> anyhow::Result<Zeroizing<String>> {
        let password = self.read("New password (empty for none)")?;
        if let PasswordSource::Prompt = self {
            let confirm = self.read("Confirm password")?;
            if *password != *confirm {
                anyhow::bail!("passwords do not match");
            }
        }
        Ok(password)
    }
}

/// Read one line from stdin, e.g. a recovery phrase.
pub fn read_line(prompt: &str) -> anyhow::Result<Zeroizing<String>> {
    eprint!("{prompt}: ");
    io::stderr().flush()?;
    let mut line = Zeroizing::new(String::new());
    io::stdin()
        .read_line(&mut line)
        .context("failed to read from stdin")?;
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_source_reads_variable() {
        std::env::set_var("SOL_WALLET_TEST_PASSWORD", "hunter2");
        let source = PasswordSource::new(Some("SOL_WALLET_TEST_PASSWORD".to_string()));
        assert_eq!(source.read("unused").unwrap().as_str(), "hunter2");
        assert_eq!(source.read_new().unwrap().as_str(), "hunter2");
    }

    #[test]
    fn missing_variable_is_an_error() {
        let source = PasswordSource::new(Some("SOL_WALLET_TEST_UNSET_VARIABLE".to_string()));
        assert!(source.read("unused").is_err());
    }
}
