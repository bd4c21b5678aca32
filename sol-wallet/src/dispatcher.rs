//! Builds, signs and submits transfers for the selected account.

use std::sync::Arc;

use sol_crypto::{PublicKey, Signature};
use tracing::{debug, info};

use crate::cluster::ClusterClient;
use crate::error::{WalletError, WalletResult};
use crate::message::{self, Instruction, Message, Transaction};
use crate::session::WalletSession;
use crate::signer::Signer;

/// A signed message ready for broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedEnvelope {
    pub message: Vec<u8>,
    pub signature: Signature,
    pub signer: PublicKey,
}

impl SignedEnvelope {
    pub fn verify(&self) -> bool {
        self.signature.verify(&self.signer, &self.message)
    }

    pub fn to_wire(&self) -> Vec<u8> {
        Transaction {
            signatures: vec![self.signature],
            message: self.message.clone(),
        }
        .to_wire()
    }
}

pub struct SigningDispatcher {
    cluster: Arc<dyn ClusterClient>,
}

impl SigningDispatcher {
    pub fn new(cluster: Arc<dyn ClusterClient>) -> Self {
        Self { cluster }
    }

    /// Transfer lamports from the selected account.
    pub async fn transfer_sol(
        &self,
        session: &WalletSession,
        destination: PublicKey,
        lamports: u64,
    ) -> WalletResult<SignedEnvelope> {
        let signer = session.resolve_signer()?;
        let from = signer.public_key();
        info!(target: "sol::wallet", %from, to = %destination, lamports, "sol transfer");
        self.sign(&signer, &[message::system_transfer(&from, &destination, lamports)])
            .await
    }

    /// Transfer tokens out of `source`.
    ///
    /// When `source` is the signer's own account this is a SOL transfer, which
    /// cannot carry a memo.
    pub async fn transfer_token(
        &self,
        session: &WalletSession,
        source: PublicKey,
        destination: PublicKey,
        amount: u64,
        memo: Option<&str>,
    ) -> WalletResult<SignedEnvelope> {
        let signer = session.resolve_signer()?;
        let owner = signer.public_key();
        let memo = memo.filter(|m| !m.is_empty());

        if source == owner {
            if memo.is_some() {
                return Err(WalletError::MemoNotImplemented);
            }
            return self.transfer_sol(session, destination, amount).await;
        }

        info!(target: "sol::wallet", %source, to = %destination, amount, "token transfer");
        let mut instructions = vec![message::token_transfer(&source, &destination, &owner, amount)?];
        if let Some(memo) = memo {
            instructions.push(message::memo(memo)?);
        }
        self.sign(&signer, &instructions).await
    }

    /// Broadcast a signed envelope, returning the transaction signature.
    pub async fn submit(&self, envelope: &SignedEnvelope) -> WalletResult<String> {
        let id = self.cluster.send_transaction(&envelope.to_wire()).await?;
        info!(target: "sol::wallet", signature = %id, "transaction submitted");
        Ok(id)
    }

    async fn sign(
        &self,
        signer: &Signer,
        instructions: &[Instruction],
    ) -> WalletResult<SignedEnvelope> {
        let payer = signer.public_key();
        // one fetch before signing; a slow device approval can outlive it
        let blockhash = self.cluster.recent_blockhash().await?;
        let message = Message::new(instructions, &payer, blockhash).serialize();
        debug!(target: "sol::wallet", %blockhash, len = message.len(), "message compiled");

        let signature = signer.sign(&message).await?;
        Ok(SignedEnvelope {
            message,
            signature,
            signer: payer,
        })
    }
}
