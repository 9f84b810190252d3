//! CLI command implementations
//!
//! Each module contains the command definitions and execution logic
//! for one command group.

pub mod amm;
pub mod contract;
pub mod dendron;
pub mod hetu;
pub mod stake;
pub mod subnet;
pub mod tx;
pub mod wallet;
pub mod weights;
pub mod whetu;

use crate::cli::context::CommandContext;
use crate::cli::utils::{print_info, print_warning, spinner};
use crate::chain::{RpcClient, TxSigner};
use crate::contracts::Erc20;
use crate::utils::balance::format_amount;
use clap::Args;
use ethers_core::types::{Address, U256};

/// Contract address and endpoint overrides shared by contract commands.
#[derive(Args, Clone, Debug, Default)]
pub struct ContractOpts {
    /// Contract address (defaults to the configured one)
    #[arg(long)]
    pub contract: Option<String>,
    /// JSON-RPC endpoint override
    #[arg(long)]
    pub rpc: Option<String>,
}

/// Who signs a state-changing command.
#[derive(Args, Clone, Debug, Default)]
pub struct SignerOpts {
    /// Keystore name or address of the sender
    #[arg(long, conflicts_with = "private_key")]
    pub sender: Option<String>,
    /// Raw private key of the sender
    #[arg(long)]
    pub private_key: Option<String>,
    /// Keystore password (prompted when omitted)
    #[arg(long)]
    pub password: Option<String>,
}

impl SignerOpts {
    pub(crate) fn signer(&self, ctx: &CommandContext) -> anyhow::Result<TxSigner> {
        ctx.signer(
            self.sender.as_deref(),
            self.private_key.as_deref(),
            self.password.clone(),
        )
    }
}

/// Run a read call behind a spinner, attaching `what` to any error.
pub(crate) async fn fetch<T, E, F>(what: &str, fut: F) -> anyhow::Result<T>
where
    F: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let pb = spinner(&format!("Fetching {}...", what));
    let result = fut.await;
    pb.finish_and_clear();
    result.map_err(|e| anyhow::anyhow!("Failed to fetch {}: {}", what, e))
}

/// Approve `spender` for `amount` of `token` unless the allowance already covers it.
pub(crate) async fn ensure_allowance(
    ctx: &CommandContext,
    client: &RpcClient,
    signer: &TxSigner,
    token: &Erc20,
    spender: Address,
    amount: U256,
    decimals: u32,
) -> anyhow::Result<()> {
    let allowance = token
        .allowance(signer.address(), spender)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read allowance: {}", e))?;
    if allowance >= amount {
        print_info(&format!(
            "Allowance {} already covers {}",
            format_amount(allowance, decimals),
            format_amount(amount, decimals)
        ));
        return Ok(());
    }

    print_warning(&format!(
        "Allowance {} is below {}, approving",
        format_amount(allowance, decimals),
        format_amount(amount, decimals)
    ));
    let call = token.approve(spender, amount)?.with_label("Approve");
    ctx.run_transaction(client, signer, call).await?;
    Ok(())
}
