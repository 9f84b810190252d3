//! Native HETU transfers.

use crate::chain::ContractCall;
use crate::cli::context::CommandContext;
use crate::cli::utils::{print_info, spinner};
use crate::core::constants::GAS_NATIVE_TRANSFER;
use crate::utils::address::{checksum, parse_address};
use crate::utils::balance::{format_hetu_with_symbol, parse_hetu};
use clap::{Args, Subcommand};

/// Transaction command container
#[derive(Args, Clone)]
pub struct TxCommand {
    #[command(subcommand)]
    pub command: TxCommands,
}

#[derive(Subcommand, Clone)]
pub enum TxCommands {
    /// Send native HETU to an address
    Send {
        /// Keystore name or address of the sender
        #[arg(long, conflicts_with = "private_key")]
        sender: Option<String>,
        /// Raw private key of the sender
        #[arg(long)]
        private_key: Option<String>,
        /// Keystore password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
        /// Recipient address
        #[arg(long)]
        to: String,
        /// Amount in HETU, e.g. 1.5
        #[arg(long)]
        value: String,
        /// JSON-RPC endpoint override
        #[arg(long)]
        rpc: Option<String>,
    },
}

pub async fn execute(cmd: TxCommand, ctx: &CommandContext) -> anyhow::Result<()> {
    match cmd.command {
        TxCommands::Send {
            sender,
            private_key,
            password,
            to,
            value,
            rpc,
        } => {
            send(
                ctx,
                sender.as_deref(),
                private_key.as_deref(),
                password,
                &to,
                &value,
                rpc.as_deref(),
            )
            .await
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn send(
    ctx: &CommandContext,
    sender: Option<&str>,
    private_key: Option<&str>,
    password: Option<String>,
    to: &str,
    value: &str,
    rpc: Option<&str>,
) -> anyhow::Result<()> {
    let to = parse_address(to)?;
    let amount = parse_hetu(value)?;
    let client = ctx.rpc_client(rpc)?;
    let signer = ctx.signer(sender, private_key, password)?;

    let pb = spinner("Checking balance...");
    let balance = client.get_balance(signer.address()).await;
    pb.finish_and_clear();
    let balance = balance.map_err(|e| anyhow::anyhow!("Failed to fetch balance: {}", e))?;
    if balance < amount {
        anyhow::bail!(
            "Insufficient balance: {} available, {} requested",
            format_hetu_with_symbol(balance),
            format_hetu_with_symbol(amount)
        );
    }

    print_info(&format!(
        "Sending {} from {} to {}",
        format_hetu_with_symbol(amount),
        checksum(&signer.address()),
        checksum(&to)
    ));
    let call = ContractCall::transfer(to, amount, GAS_NATIVE_TRANSFER);
    let receipt = ctx.run_transaction(&client, &signer, call).await?;
    println!(
        "Transaction sent: {}",
        receipt
            .raw()
            .get("transactionHash")
            .and_then(|h| h.as_str())
            .unwrap_or_default()
    );
    Ok(())
}
