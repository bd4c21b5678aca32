//! Transfer command - signs a SOL transfer offline

use std::sync::Arc;

use anyhow::Context;
use sol_config::ClusterConfig;
use sol_crypto::PublicKey;
use sol_wallet::{AccountKind, Hash, OfflineCluster, SigningDispatcher};

use super::ledger::open_device;
use super::{CommandContext, CommandResult};

pub async fn execute(
    ctx: &mut CommandContext,
    to: &str,
    lamports: u64,
    blockhash: &str,
) -> CommandResult {
    let destination: PublicKey = to.parse().context("invalid destination address")?;
    let blockhash: Hash = blockhash.parse().context("invalid blockhash")?;

    ctx.unlock()?;
    let selected = ctx.session.registry.selected();
    if ctx.session.registry.kind_of(selected) == Some(AccountKind::Hardware) {
        let device = open_device(&ctx.config)?;
        ctx.session.attach_hardware(device);
        eprintln!("Approve the transfer on your Ledger...");
    }

    let dispatcher = SigningDispatcher::new(Arc::new(OfflineCluster::new(blockhash)));
    let envelope = dispatcher
        .transfer_sol(&ctx.session, destination, lamports)
        .await?;
    eprintln!("{}", broadcast_hint(&ctx.config.cluster));
    Ok(bs58::encode(envelope.to_wire()).into_string())
}

fn broadcast_hint(cluster: &ClusterConfig) -> String {
    format!(
        "Signed offline. Submit with sendTransaction (base58 encoding) to {}",
        cluster.url
    )
}
