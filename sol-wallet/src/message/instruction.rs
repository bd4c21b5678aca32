//! Instructions for the programs the wallet talks to.

use sol_crypto::PublicKey;

use crate::error::WalletResult;

pub const TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
pub const MEMO_PROGRAM_ID: &str = "Memo1UhkJRfHyevW3Asrg9KWuZ7k5E5pDLkpENpHtWyW";

/// System program transfer discriminant
const SYSTEM_TRANSFER: u32 = 2;
/// Token program transfer discriminant
const TOKEN_TRANSFER: u8 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountMeta {
    pub pubkey: PublicKey,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl AccountMeta {
    pub fn new(pubkey: PublicKey, is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: true,
        }
    }

    pub fn new_readonly(pubkey: PublicKey, is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub program_id: PublicKey,
    pub accounts: Vec<AccountMeta>,
    pub data: Vec<u8>,
}

/// The system program id is 32 zero bytes.
pub fn system_program_id() -> PublicKey {
    PublicKey::default()
}

pub fn token_program_id() -> WalletResult<PublicKey> {
    Ok(TOKEN_PROGRAM_ID.parse()?)
}

pub fn memo_program_id() -> WalletResult<PublicKey> {
    Ok(MEMO_PROGRAM_ID.parse()?)
}

/// Move `lamports` from `from` to `to`.
pub fn system_transfer(from: &PublicKey, to: &PublicKey, lamports: u64) -> Instruction {
    let mut data = Vec::with_capacity(12);
    data.extend_from_slice(&SYSTEM_TRANSFER.to_le_bytes());
    data.extend_from_slice(&lamports.to_le_bytes());
    Instruction {
        program_id: system_program_id(),
        accounts: vec![AccountMeta::new(*from, true), AccountMeta::new(*to, false)],
        data,
    }
}

/// Move `amount` base units between token accounts owned by `owner`.
pub fn token_transfer(
    source: &PublicKey,
    destination: &PublicKey,
    owner: &PublicKey,
    amount: u64,
) -> WalletResult<Instruction> {
    let mut data = Vec::with_capacity(9);
    data.push(TOKEN_TRANSFER);
    data.extend_from_slice(&amount.to_le_bytes());
    Ok(Instruction {
        program_id: token_program_id()?,
        accounts: vec![
            AccountMeta::new(*source, false),
            AccountMeta::new(*destination, false),
            AccountMeta::new_readonly(*owner, true),
        ],
        data,
    })
}

pub fn memo(text: &str) -> WalletResult<Instruction> {
    Ok(Instruction {
        program_id: memo_program_id()?,
        accounts: Vec::new(),
        data: text.as_bytes().to_vec(),
    })
}
