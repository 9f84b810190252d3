//! Global staking commands.

use super::{ensure_allowance, fetch, ContractOpts, SignerOpts};
use crate::chain::RpcClient;
use crate::cli::context::CommandContext;
use crate::cli::utils::{create_field_table, print_info};
use crate::config::ContractKey;
use crate::contracts::{ContractWrapper, Erc20, GlobalStaking};
use crate::core::constants::HETU_DECIMALS;
use crate::utils::address::checksum;
use crate::utils::balance::{format_hetu_with_symbol, parse_hetu};
use clap::{Args, Subcommand};

#[derive(Args, Clone)]
pub struct StakeCommand {
    #[command(subcommand)]
    pub command: StakeCommands,
}

#[derive(Subcommand, Clone)]
pub enum StakeCommands {
    /// Stake WHETU into the global pool
    AddStake {
        #[command(flatten)]
        signer: SignerOpts,
        /// Amount in HETU
        #[arg(long)]
        amount: String,
        #[command(flatten)]
        opts: ContractOpts,
    },

    /// Withdraw unallocated stake
    RemoveStake {
        #[command(flatten)]
        signer: SignerOpts,
        /// Amount in HETU
        #[arg(long)]
        amount: String,
        #[command(flatten)]
        opts: ContractOpts,
    },

    /// Allocate stake to a subnet
    Allocate {
        #[command(flatten)]
        signer: SignerOpts,
        #[arg(long)]
        netuid: u16,
        /// Amount in HETU
        #[arg(long)]
        amount: String,
        #[command(flatten)]
        opts: ContractOpts,
    },

    /// Staking summary of an account
    StakeInfo {
        /// Keystore name or address
        #[arg(long)]
        account: String,
        #[command(flatten)]
        opts: ContractOpts,
    },

    /// Stake not allocated to any subnet
    AvailableStake {
        #[arg(long)]
        account: String,
        #[command(flatten)]
        opts: ContractOpts,
    },

    /// Stake allocated to one subnet
    SubnetAllocation {
        #[arg(long)]
        account: String,
        #[arg(long)]
        netuid: u16,
        #[command(flatten)]
        opts: ContractOpts,
    },
}

fn connect(ctx: &CommandContext, opts: &ContractOpts) -> anyhow::Result<(RpcClient, GlobalStaking)> {
    let client = ctx.rpc_client(opts.rpc.as_deref())?;
    let staking = ctx.contract(&client, opts.contract.as_deref(), ContractKey::Staking)?;
    Ok((client, staking))
}

pub async fn execute(cmd: StakeCommand, ctx: &CommandContext) -> anyhow::Result<()> {
    match cmd.command {
        StakeCommands::AddStake {
            signer,
            amount,
            opts,
        } => {
            let amount = parse_hetu(&amount)?;
            let (client, staking) = connect(ctx, &opts)?;
            let tx_signer = signer.signer(ctx)?;

            let token_address = fetch("HETU token", staking.hetu_token()).await?;
            let whetu: Erc20 = ctx.contract_at(&client, token_address)?;
            let balance = fetch("WHETU balance", whetu.balance_of(tx_signer.address())).await?;
            if balance < amount {
                anyhow::bail!(
                    "Insufficient WHETU balance: have {}, need {}. Wrap HETU first with `hetucli whetu deposit`",
                    format_hetu_with_symbol(balance),
                    format_hetu_with_symbol(amount)
                );
            }
            ensure_allowance(
                ctx,
                &client,
                &tx_signer,
                &whetu,
                staking.address(),
                amount,
                HETU_DECIMALS,
            )
            .await?;

            print_info(&format!("Staking {}", format_hetu_with_symbol(amount)));
            let call = staking.add_global_stake(amount)?.with_label("AddGlobalStake");
            ctx.run_transaction(&client, &tx_signer, call).await?;
            Ok(())
        }
        StakeCommands::RemoveStake {
            signer,
            amount,
            opts,
        } => {
            let amount = parse_hetu(&amount)?;
            let (client, staking) = connect(ctx, &opts)?;
            let tx_signer = signer.signer(ctx)?;

            let available = fetch("available stake", staking.available_stake(tx_signer.address())).await?;
            if available < amount {
                anyhow::bail!(
                    "Insufficient available stake: have {}, need {}",
                    format_hetu_with_symbol(available),
                    format_hetu_with_symbol(amount)
                );
            }
            let call = staking.remove_global_stake(amount)?.with_label("RemoveGlobalStake");
            ctx.run_transaction(&client, &tx_signer, call).await?;
            Ok(())
        }
        StakeCommands::Allocate {
            signer,
            netuid,
            amount,
            opts,
        } => {
            let amount = parse_hetu(&amount)?;
            let (client, staking) = connect(ctx, &opts)?;
            let tx_signer = signer.signer(ctx)?;

            let available = fetch("available stake", staking.available_stake(tx_signer.address())).await?;
            if available < amount {
                anyhow::bail!(
                    "Insufficient available stake: have {}, need {}. Add stake first with `hetucli stake add-stake`",
                    format_hetu_with_symbol(available),
                    format_hetu_with_symbol(amount)
                );
            }
            print_info(&format!(
                "Allocating {} to subnet {}",
                format_hetu_with_symbol(amount),
                netuid
            ));
            let call = staking
                .allocate_to_subnet(netuid, amount)?
                .with_label("AllocateToSubnet");
            ctx.run_transaction(&client, &tx_signer, call).await?;
            Ok(())
        }
        StakeCommands::StakeInfo { account, opts } => {
            let account = ctx.resolve_account(&account)?;
            let (_, staking) = connect(ctx, &opts)?;
            let info = fetch("stake info", staking.stake_info(account)).await?;
            let available = fetch("available stake", staking.available_stake(account)).await?;
            let rows = vec![
                ("Account", checksum(&account)),
                ("Total staked", format_hetu_with_symbol(info.total_staked)),
                ("Total allocated", format_hetu_with_symbol(info.total_allocated)),
                ("Available", format_hetu_with_symbol(available)),
                ("Total cost", format_hetu_with_symbol(info.total_cost)),
                ("Last update block", info.last_update_block.to_string()),
            ];
            println!("{}", create_field_table(&rows));
            Ok(())
        }
        StakeCommands::AvailableStake { account, opts } => {
            let account = ctx.resolve_account(&account)?;
            let (_, staking) = connect(ctx, &opts)?;
            let available = fetch("available stake", staking.available_stake(account)).await?;
            println!(
                "Available stake of {}: {}",
                checksum(&account),
                format_hetu_with_symbol(available)
            );
            Ok(())
        }
        StakeCommands::SubnetAllocation {
            account,
            netuid,
            opts,
        } => {
            let account = ctx.resolve_account(&account)?;
            let (_, staking) = connect(ctx, &opts)?;
            let allocation = fetch("subnet allocation", staking.subnet_allocation(account, netuid)).await?;
            let rows = vec![
                ("Account", checksum(&account)),
                ("Subnet", netuid.to_string()),
                ("Allocated", format_hetu_with_symbol(allocation.allocated)),
                ("Cost", format_hetu_with_symbol(allocation.cost)),
                ("Last update block", allocation.last_update_block.to_string()),
            ];
            println!("{}", create_field_table(&rows));
            Ok(())
        }
    }
}
