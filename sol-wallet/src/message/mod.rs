//! Legacy transaction message serialization.
//!
//! Layout: a 3-byte header, the account key list, the recent blockhash and
//! the compiled instructions, with compact length prefixes before every list.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use sol_crypto::{CryptoError, PublicKey, Signature};

mod instruction;
mod short_vec;

pub use instruction::{
    memo, memo_program_id, system_program_id, system_transfer, token_program_id, token_transfer,
    AccountMeta, Instruction, MEMO_PROGRAM_ID, TOKEN_PROGRAM_ID,
};
use short_vec::encode_len;

/// Recent blockhash, base58 encoded like keys.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Hash([u8; 32]);

impl Hash {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58_hash(&self.0))
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({self})")
    }
}

impl FromStr for Hash {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // same alphabet and width as a public key
        let key: PublicKey = s.parse()?;
        Ok(Self(key.to_bytes()))
    }
}

fn bs58_hash(bytes: &[u8; 32]) -> String {
    PublicKey::new(*bytes).to_base58()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MessageHeader {
    pub num_required_signatures: u8,
    pub num_readonly_signed_accounts: u8,
    pub num_readonly_unsigned_accounts: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub accounts: Vec<u8>,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub header: MessageHeader,
    pub account_keys: Vec<PublicKey>,
    pub recent_blockhash: Hash,
    pub instructions: Vec<CompiledInstruction>,
}

impl Message {
    /// Compile `instructions` with `payer` as the first signer.
    ///
    /// Keys are ordered writable signers, readonly signers, writable
    /// non-signers, readonly non-signers; a key used in several roles gets
    /// the union of its flags.
    pub fn new(instructions: &[Instruction], payer: &PublicKey, recent_blockhash: Hash) -> Self {
        let mut metas: Vec<AccountMeta> = vec![AccountMeta::new(*payer, true)];
        let mut upsert = |meta: AccountMeta| {
            match metas.iter_mut().find(|m| m.pubkey == meta.pubkey) {
                Some(existing) => {
                    existing.is_signer |= meta.is_signer;
                    existing.is_writable |= meta.is_writable;
                }
                None => metas.push(meta),
            }
        };
        for ix in instructions {
            for meta in &ix.accounts {
                upsert(meta.clone());
            }
            upsert(AccountMeta::new_readonly(ix.program_id, false));
        }
        metas.sort_by_key(|m| (!m.is_signer, !m.is_writable));

        let header = MessageHeader {
            num_required_signatures: metas.iter().filter(|m| m.is_signer).count() as u8,
            num_readonly_signed_accounts: metas
                .iter()
                .filter(|m| m.is_signer && !m.is_writable)
                .count() as u8,
            num_readonly_unsigned_accounts: metas
                .iter()
                .filter(|m| !m.is_signer && !m.is_writable)
                .count() as u8,
        };

        let account_keys: Vec<PublicKey> = metas.iter().map(|m| m.pubkey).collect();
        let positions: HashMap<PublicKey, u8> = account_keys
            .iter()
            .enumerate()
            .map(|(i, key)| (*key, i as u8))
            .collect();

        let instructions = instructions
            .iter()
            .map(|ix| CompiledInstruction {
                program_id_index: positions[&ix.program_id],
                accounts: ix.accounts.iter().map(|m| positions[&m.pubkey]).collect(),
                data: ix.data.clone(),
            })
            .collect();

        Self {
            header,
            account_keys,
            recent_blockhash,
            instructions,
        }
    }

    /// Bytes the signers sign.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(128);
        out.push(self.header.num_required_signatures);
        out.push(self.header.num_readonly_signed_accounts);
        out.push(self.header.num_readonly_unsigned_accounts);

        encode_len(self.account_keys.len(), &mut out);
        for key in &self.account_keys {
            out.extend_from_slice(key.as_bytes());
        }
        out.extend_from_slice(self.recent_blockhash.as_bytes());

        encode_len(self.instructions.len(), &mut out);
        for ix in &self.instructions {
            out.push(ix.program_id_index);
            encode_len(ix.accounts.len(), &mut out);
            out.extend_from_slice(&ix.accounts);
            encode_len(ix.data.len(), &mut out);
            out.extend_from_slice(&ix.data);
        }
        out
    }

    pub fn signer_keys(&self) -> &[PublicKey] {
        &self.account_keys[..self.header.num_required_signatures as usize]
    }
}

/// Signatures plus the serialized message they cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub signatures: Vec<Signature>,
    pub message: Vec<u8>,
}

impl Transaction {
    /// Broadcast payload.
    pub fn to_wire(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + self.signatures.len() * 64 + self.message.len());
        encode_len(self.signatures.len(), &mut out);
        for signature in &self.signatures {
            out.extend_from_slice(signature.as_bytes());
        }
        out.extend_from_slice(&self.message);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(byte: u8) -> PublicKey {
        PublicKey::new([byte; 32])
    }

    #[test]
    fn transfer_message_layout() {
        let payer = key(1);
        let to = key(2);
        let blockhash = Hash::new([9; 32]);
        let message = Message::new(&[system_transfer(&payer, &to, 42)], &payer, blockhash);

        assert_eq!(
            message.header,
            MessageHeader {
                num_required_signatures: 1,
                num_readonly_signed_accounts: 0,
                num_readonly_unsigned_accounts: 1,
            }
        );
        assert_eq!(message.account_keys, vec![payer, to, system_program_id()]);
        assert_eq!(message.instructions[0].program_id_index, 2);
        assert_eq!(message.instructions[0].accounts, vec![0, 1]);

        let bytes = message.serialize();
        // header, 3 keys, blockhash, 1 instruction of 1 + 1 + 2 + 1 + 12 bytes
        assert_eq!(bytes.len(), 3 + 1 + 96 + 32 + 1 + 17);
        assert_eq!(&bytes[..4], &[1, 0, 1, 3]);
        assert_eq!(&bytes[4..36], payer.as_bytes());
        assert_eq!(&bytes[100..132], blockhash.as_bytes());
    }

    #[test]
    fn owner_signs_token_transfer_with_memo() {
        let owner = key(5);
        let source = key(6);
        let destination = key(7);
        let instructions = vec![
            token_transfer(&source, &destination, &owner, 10).unwrap(),
            memo("invoice 17").unwrap(),
        ];
        let message = Message::new(&instructions, &owner, Hash::default());

        assert_eq!(message.signer_keys(), &[owner]);
        assert_eq!(message.account_keys[0], owner);
        assert_eq!(message.account_keys[1..3], [source, destination]);
        // both program ids are readonly non-signers
        assert_eq!(message.header.num_readonly_unsigned_accounts, 2);
        assert_eq!(message.instructions[1].data, b"invoice 17".to_vec());
        assert!(message.instructions[1].accounts.is_empty());
    }

    #[test]
    fn wire_prefixes_signatures() {
        let tx = Transaction {
            signatures: vec![Signature::new([0xAA; 64])],
            message: vec![1, 2, 3],
        };
        let wire = tx.to_wire();
        assert_eq!(wire[0], 1);
        assert_eq!(&wire[1..65], &[0xAA; 64]);
        assert_eq!(&wire[65..], &[1, 2, 3]);
    }

    #[test]
    fn hash_parses_base58() {
        let hash: Hash = "11111111111111111111111111111111".parse().unwrap();
        assert_eq!(hash, Hash::default());
        assert!("not-base58!".parse::<Hash>().is_err());
    }
}
