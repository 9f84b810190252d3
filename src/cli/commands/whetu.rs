//! Wrapped HETU (WHETU) token commands.

use super::{fetch, ContractOpts, SignerOpts};
use crate::chain::RpcClient;
use crate::cli::context::CommandContext;
use crate::cli::utils::print_info;
use crate::config::ContractKey;
use crate::contracts::Whetu;
use crate::utils::address::checksum;
use crate::utils::balance::{format_amount, parse_amount, parse_hetu};
use clap::{Args, Subcommand};

#[derive(Args, Clone)]
pub struct WhetuCommand {
    #[command(subcommand)]
    pub command: WhetuCommands,
}

#[derive(Subcommand, Clone)]
pub enum WhetuCommands {
    /// WHETU balance of an account
    BalanceOf {
        /// Keystore name or address
        #[arg(long)]
        account: String,
        #[command(flatten)]
        opts: ContractOpts,
    },

    /// Wrap native HETU into WHETU
    Deposit {
        #[command(flatten)]
        signer: SignerOpts,
        /// Amount in HETU
        #[arg(long)]
        amount: String,
        #[command(flatten)]
        opts: ContractOpts,
    },

    /// Unwrap WHETU back to native HETU
    Withdraw {
        #[command(flatten)]
        signer: SignerOpts,
        /// Amount in WHETU
        #[arg(long)]
        amount: String,
        #[command(flatten)]
        opts: ContractOpts,
    },

    /// Approve a spender
    Approve {
        #[command(flatten)]
        signer: SignerOpts,
        /// Spender keystore name or address
        #[arg(long)]
        spender: String,
        /// Amount in WHETU
        #[arg(long)]
        amount: String,
        #[command(flatten)]
        opts: ContractOpts,
    },

    /// Allowance granted by an owner to a spender
    Allowance {
        #[arg(long)]
        owner: String,
        #[arg(long)]
        spender: String,
        #[command(flatten)]
        opts: ContractOpts,
    },

    /// Total WHETU supply
    TotalSupply {
        #[command(flatten)]
        opts: ContractOpts,
    },
}

fn connect(ctx: &CommandContext, opts: &ContractOpts) -> anyhow::Result<(RpcClient, Whetu)> {
    let client = ctx.rpc_client(opts.rpc.as_deref())?;
    let whetu = ctx.contract(&client, opts.contract.as_deref(), ContractKey::Whetu)?;
    Ok((client, whetu))
}

async fn decimals(whetu: &Whetu) -> anyhow::Result<u32> {
    Ok(u32::from(fetch("token decimals", whetu.decimals()).await?))
}

pub async fn execute(cmd: WhetuCommand, ctx: &CommandContext) -> anyhow::Result<()> {
    match cmd.command {
        WhetuCommands::BalanceOf { account, opts } => {
            let account = ctx.resolve_account(&account)?;
            let (_, whetu) = connect(ctx, &opts)?;
            let decimals = decimals(&whetu).await?;
            let balance = fetch("WHETU balance", whetu.balance_of(account)).await?;
            println!(
                "WHETU balance of {}: {} WHETU",
                checksum(&account),
                format_amount(balance, decimals)
            );
            Ok(())
        }
        WhetuCommands::Deposit {
            signer,
            amount,
            opts,
        } => {
            let value = parse_hetu(&amount)?;
            let (client, whetu) = connect(ctx, &opts)?;
            let tx_signer = signer.signer(ctx)?;
            let native = fetch("balance", client.get_balance(tx_signer.address())).await?;
            if native < value {
                anyhow::bail!("Insufficient HETU balance for deposit of {} HETU", amount);
            }
            print_info(&format!("Wrapping {} HETU", amount));
            let call = whetu.deposit(value)?.with_label("Deposit");
            ctx.run_transaction(&client, &tx_signer, call).await?;
            Ok(())
        }
        WhetuCommands::Withdraw {
            signer,
            amount,
            opts,
        } => {
            let (client, whetu) = connect(ctx, &opts)?;
            let value = parse_amount(&amount, decimals(&whetu).await?)?;
            let tx_signer = signer.signer(ctx)?;
            let balance = fetch("WHETU balance", whetu.balance_of(tx_signer.address())).await?;
            if balance < value {
                anyhow::bail!("Insufficient WHETU balance for withdrawal of {} WHETU", amount);
            }
            let call = whetu.withdraw(value)?.with_label("Withdraw");
            ctx.run_transaction(&client, &tx_signer, call).await?;
            Ok(())
        }
        WhetuCommands::Approve {
            signer,
            spender,
            amount,
            opts,
        } => {
            let spender = ctx.resolve_account(&spender)?;
            let (client, whetu) = connect(ctx, &opts)?;
            let value = parse_amount(&amount, decimals(&whetu).await?)?;
            let tx_signer = signer.signer(ctx)?;
            let call = whetu.approve(spender, value)?.with_label("Approve");
            ctx.run_transaction(&client, &tx_signer, call).await?;
            Ok(())
        }
        WhetuCommands::Allowance {
            owner,
            spender,
            opts,
        } => {
            let owner = ctx.resolve_account(&owner)?;
            let spender = ctx.resolve_account(&spender)?;
            let (_, whetu) = connect(ctx, &opts)?;
            let decimals = decimals(&whetu).await?;
            let allowance = fetch("allowance", whetu.allowance(owner, spender)).await?;
            println!(
                "Allowance of {} for {}: {} WHETU",
                checksum(&owner),
                checksum(&spender),
                format_amount(allowance, decimals)
            );
            Ok(())
        }
        WhetuCommands::TotalSupply { opts } => {
            let (_, whetu) = connect(ctx, &opts)?;
            let decimals = decimals(&whetu).await?;
            let supply = fetch("total supply", whetu.total_supply()).await?;
            println!("Total supply: {} WHETU", format_amount(supply, decimals));
            Ok(())
        }
    }
}
