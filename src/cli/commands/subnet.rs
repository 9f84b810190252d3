//! Subnet registry commands.

use super::{ensure_allowance, fetch, ContractOpts, SignerOpts};
use crate::cli::context::CommandContext;
use crate::cli::utils::{
    create_field_table, create_table_with_headers, print_info, print_success, read_json_source,
};
use crate::config::ContractKey;
use crate::contracts::{
    ContractWrapper, Erc20, SubnetDetails, SubnetHyperparams, SubnetInfo, SubnetManager,
};
use crate::utils::address::checksum;
use crate::utils::balance::{format_amount, format_hetu, format_hetu_with_symbol, parse_hetu};
use clap::{Args, Subcommand};
use ethers_core::types::U256;
use std::path::PathBuf;

/// Subnet command container
#[derive(Args, Clone)]
pub struct SubnetCommand {
    #[command(subcommand)]
    pub command: SubnetCommands,
}

/// Available subnet operations
#[derive(Subcommand, Clone)]
pub enum SubnetCommands {
    /// Netuid the next registration will receive
    NextNetuid {
        #[command(flatten)]
        opts: ContractOpts,
    },

    /// Registry record, hyperparameters and pool state of a subnet
    SubnetDetails {
        #[arg(long)]
        netuid: u16,
        #[command(flatten)]
        opts: ContractOpts,
    },

    /// Registry record of a subnet
    SubnetInfo {
        #[arg(long)]
        netuid: u16,
        #[command(flatten)]
        opts: ContractOpts,
    },

    /// Hyperparameters of a subnet (getSubnetParams)
    SubnetParams {
        #[arg(long)]
        netuid: u16,
        #[command(flatten)]
        opts: ContractOpts,
    },

    /// Subnets owned by an account
    UserSubnets {
        /// Keystore name or address
        #[arg(long)]
        user: String,
        #[command(flatten)]
        opts: ContractOpts,
    },

    /// Number of registered subnets
    TotalNetworks {
        #[command(flatten)]
        opts: ContractOpts,
    },

    /// Register a new subnet, locking WHETU
    Regist {
        #[command(flatten)]
        signer: SignerOpts,
        /// Subnet name
        #[arg(long)]
        name: String,
        /// Subnet description
        #[arg(long, default_value = "")]
        description: String,
        /// Alpha token name
        #[arg(long)]
        token_name: String,
        /// Alpha token symbol
        #[arg(long)]
        token_symbol: String,
        #[command(flatten)]
        opts: ContractOpts,
    },

    /// Change the name and description of a subnet
    UpdateSubnetInfo {
        #[command(flatten)]
        signer: SignerOpts,
        #[arg(long)]
        netuid: u16,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[command(flatten)]
        opts: ContractOpts,
    },

    /// Activate a registered subnet
    ActivateSubnet {
        #[command(flatten)]
        signer: SignerOpts,
        #[arg(long)]
        netuid: u16,
        #[command(flatten)]
        opts: ContractOpts,
    },

    /// Update registry-wide lock parameters
    UpdateNetworkParams {
        #[command(flatten)]
        signer: SignerOpts,
        /// Minimum lock in HETU as a decimal (e.g. 100 or 0.5), sent on chain in wei
        #[arg(long, value_name = "HETU")]
        min_lock: String,
        /// Blocks between registrations
        #[arg(long)]
        rate_limit: u64,
        /// Blocks over which the lock cost decays
        #[arg(long)]
        reduction_interval: u64,
        #[command(flatten)]
        opts: ContractOpts,
    },

    /// Update subnet hyperparameters from JSON keyed by field name
    UpdateSubnetParams {
        #[command(flatten)]
        signer: SignerOpts,
        #[arg(long)]
        netuid: u16,
        /// Inline JSON object, e.g. '{"tempo": 100}'
        #[arg(long, conflicts_with = "params_file")]
        params_json: Option<String>,
        /// File holding the JSON object
        #[arg(long)]
        params_file: Option<PathBuf>,
        #[command(flatten)]
        opts: ContractOpts,
    },

    /// Current WHETU cost of registering a subnet
    GetNetworkLockCost {
        #[command(flatten)]
        opts: ContractOpts,
    },

    /// Hyperparameters of a subnet (getSubnetHyperparams)
    GetSubnetHyperparams {
        #[arg(long)]
        netuid: u16,
        #[command(flatten)]
        opts: ContractOpts,
    },

    /// Token locked on registration
    HetuToken {
        #[command(flatten)]
        opts: ContractOpts,
    },

    /// Amount locked by the last registration
    NetworkLastLock {
        #[command(flatten)]
        opts: ContractOpts,
    },

    /// Block of the last registration
    NetworkLastLockBlock {
        #[command(flatten)]
        opts: ContractOpts,
    },

    /// Blocks required between registrations
    NetworkRateLimit {
        #[command(flatten)]
        opts: ContractOpts,
    },

    /// Lower bound of the lock cost
    NetworkMinLock {
        #[command(flatten)]
        opts: ContractOpts,
    },

    /// Blocks over which the lock cost decays
    LockReductionInterval {
        #[command(flatten)]
        opts: ContractOpts,
    },

    /// Subnet owned by an account at a given index
    OwnerSubnets {
        /// Keystore name or address
        #[arg(long)]
        owner: String,
        #[arg(long, default_value_t = 0)]
        index: u64,
        #[command(flatten)]
        opts: ContractOpts,
    },

    /// Whether a netuid is registered
    SubnetExists {
        #[arg(long)]
        netuid: u16,
        #[command(flatten)]
        opts: ContractOpts,
    },

    /// Hyperparameters of a subnet (public mapping)
    SubnetHyperparams {
        #[arg(long)]
        netuid: u16,
        #[command(flatten)]
        opts: ContractOpts,
    },

    /// Registry record of a subnet (public mapping)
    Subnets {
        #[arg(long)]
        netuid: u16,
        #[command(flatten)]
        opts: ContractOpts,
    },
}

/// Execute subnet commands
pub async fn execute(cmd: SubnetCommand, ctx: &CommandContext) -> anyhow::Result<()> {
    match cmd.command {
        SubnetCommands::NextNetuid { opts } => {
            let subnet = connect(ctx, &opts)?;
            let netuid = fetch("next netuid", subnet.next_netuid()).await?;
            println!("Next netuid: {}", netuid);
            Ok(())
        }
        SubnetCommands::SubnetDetails { netuid, opts } => {
            let subnet = connect(ctx, &opts)?;
            let details = fetch("subnet details", subnet.subnet_details(netuid)).await?;
            print_details(&details);
            Ok(())
        }
        SubnetCommands::SubnetInfo { netuid, opts } => {
            let subnet = connect(ctx, &opts)?;
            let info = fetch("subnet info", subnet.subnet_info(netuid)).await?;
            print_subnet_info(&info);
            Ok(())
        }
        SubnetCommands::SubnetParams { netuid, opts } => {
            let subnet = connect(ctx, &opts)?;
            let params = fetch("subnet params", subnet.subnet_params(netuid)).await?;
            print_hyperparams(netuid, &params);
            Ok(())
        }
        SubnetCommands::UserSubnets { user, opts } => {
            let user = ctx.resolve_account(&user)?;
            let subnet = connect(ctx, &opts)?;
            let netuids = fetch("user subnets", subnet.user_subnets(user)).await?;
            if netuids.is_empty() {
                print_info(&format!("{} owns no subnets", checksum(&user)));
            } else {
                let list: Vec<String> = netuids.iter().map(u16::to_string).collect();
                println!("Subnets owned by {}: {}", checksum(&user), list.join(", "));
            }
            Ok(())
        }
        SubnetCommands::TotalNetworks { opts } => {
            let subnet = connect(ctx, &opts)?;
            let total = fetch("total networks", subnet.total_networks()).await?;
            println!("Total networks: {}", total);
            Ok(())
        }
        SubnetCommands::Regist {
            signer,
            name,
            description,
            token_name,
            token_symbol,
            opts,
        } => {
            register(
                ctx,
                &signer,
                &opts,
                &name,
                &description,
                &token_name,
                &token_symbol,
            )
            .await
        }
        SubnetCommands::UpdateSubnetInfo {
            signer,
            netuid,
            name,
            description,
            opts,
        } => {
            let client = ctx.rpc_client(opts.rpc.as_deref())?;
            let subnet: SubnetManager =
                ctx.contract(&client, opts.contract.as_deref(), ContractKey::Subnet)?;
            let tx_signer = signer.signer(ctx)?;
            let call = subnet
                .update_subnet_info(netuid, &name, &description)?
                .with_label("Update subnet info");
            ctx.run_transaction(&client, &tx_signer, call).await?;
            Ok(())
        }
        SubnetCommands::ActivateSubnet {
            signer,
            netuid,
            opts,
        } => {
            let client = ctx.rpc_client(opts.rpc.as_deref())?;
            let subnet: SubnetManager =
                ctx.contract(&client, opts.contract.as_deref(), ContractKey::Subnet)?;
            let tx_signer = signer.signer(ctx)?;
            let call = subnet.activate_subnet(netuid)?.with_label("Activate subnet");
            ctx.run_transaction(&client, &tx_signer, call).await?;
            Ok(())
        }
        SubnetCommands::UpdateNetworkParams {
            signer,
            min_lock,
            rate_limit,
            reduction_interval,
            opts,
        } => {
            let min_lock = parse_hetu(&min_lock)?;
            let client = ctx.rpc_client(opts.rpc.as_deref())?;
            let subnet: SubnetManager =
                ctx.contract(&client, opts.contract.as_deref(), ContractKey::Subnet)?;
            let tx_signer = signer.signer(ctx)?;
            let call = subnet
                .update_network_params(
                    min_lock,
                    U256::from(rate_limit),
                    U256::from(reduction_interval),
                )?
                .with_label("Update network params");
            ctx.run_transaction(&client, &tx_signer, call).await?;
            Ok(())
        }
        SubnetCommands::UpdateSubnetParams {
            signer,
            netuid,
            params_json,
            params_file,
            opts,
        } => {
            update_subnet_params(
                ctx,
                &signer,
                &opts,
                netuid,
                params_json.as_deref(),
                params_file.as_deref(),
            )
            .await
        }
        SubnetCommands::GetNetworkLockCost { opts } => {
            let subnet = connect(ctx, &opts)?;
            let cost = fetch("network lock cost", subnet.network_lock_cost()).await?;
            println!("Network lock cost: {}", format_hetu_with_symbol(cost));
            println!("Raw: {} wei", cost);
            Ok(())
        }
        SubnetCommands::GetSubnetHyperparams { netuid, opts } => {
            let subnet = connect(ctx, &opts)?;
            let params = fetch("subnet hyperparams", subnet.get_subnet_hyperparams(netuid)).await?;
            print_hyperparams(netuid, &params);
            Ok(())
        }
        SubnetCommands::HetuToken { opts } => {
            let subnet = connect(ctx, &opts)?;
            let token = fetch("HETU token", subnet.hetu_token()).await?;
            println!("HETU token: {}", checksum(&token));
            Ok(())
        }
        SubnetCommands::NetworkLastLock { opts } => {
            let subnet = connect(ctx, &opts)?;
            let value = fetch("last lock", subnet.network_last_lock()).await?;
            println!("Network last lock: {}", format_hetu_with_symbol(value));
            Ok(())
        }
        SubnetCommands::NetworkLastLockBlock { opts } => {
            let subnet = connect(ctx, &opts)?;
            let value = fetch("last lock block", subnet.network_last_lock_block()).await?;
            println!("Network last lock block: {}", value);
            Ok(())
        }
        SubnetCommands::NetworkRateLimit { opts } => {
            let subnet = connect(ctx, &opts)?;
            let value = fetch("rate limit", subnet.network_rate_limit()).await?;
            println!("Network rate limit: {} blocks", value);
            Ok(())
        }
        SubnetCommands::NetworkMinLock { opts } => {
            let subnet = connect(ctx, &opts)?;
            let value = fetch("minimum lock", subnet.network_min_lock()).await?;
            println!("Network min lock: {}", format_hetu_with_symbol(value));
            Ok(())
        }
        SubnetCommands::LockReductionInterval { opts } => {
            let subnet = connect(ctx, &opts)?;
            let value = fetch("lock reduction interval", subnet.lock_reduction_interval()).await?;
            println!("Lock reduction interval: {} blocks", value);
            Ok(())
        }
        SubnetCommands::OwnerSubnets { owner, index, opts } => {
            let owner = ctx.resolve_account(&owner)?;
            let subnet = connect(ctx, &opts)?;
            let netuid = fetch("owner subnet", subnet.owner_subnets(owner, U256::from(index))).await?;
            println!("Subnet {} of {}: netuid {}", index, checksum(&owner), netuid);
            Ok(())
        }
        SubnetCommands::SubnetExists { netuid, opts } => {
            let subnet = connect(ctx, &opts)?;
            let exists = fetch("subnet existence", subnet.subnet_exists(netuid)).await?;
            println!("Subnet {} exists: {}", netuid, exists);
            Ok(())
        }
        SubnetCommands::SubnetHyperparams { netuid, opts } => {
            let subnet = connect(ctx, &opts)?;
            let params = fetch("subnet hyperparams", subnet.subnet_hyperparams(netuid)).await?;
            print_hyperparams(netuid, &params);
            Ok(())
        }
        SubnetCommands::Subnets { netuid, opts } => {
            let subnet = connect(ctx, &opts)?;
            let info = fetch("subnet", subnet.subnets(netuid)).await?;
            print_subnet_info(&info);
            Ok(())
        }
    }
}

fn connect(ctx: &CommandContext, opts: &ContractOpts) -> anyhow::Result<SubnetManager> {
    let client = ctx.rpc_client(opts.rpc.as_deref())?;
    ctx.contract(&client, opts.contract.as_deref(), ContractKey::Subnet)
}

#[allow(clippy::too_many_arguments)]
async fn register(
    ctx: &CommandContext,
    signer: &SignerOpts,
    opts: &ContractOpts,
    name: &str,
    description: &str,
    token_name: &str,
    token_symbol: &str,
) -> anyhow::Result<()> {
    let client = ctx.rpc_client(opts.rpc.as_deref())?;
    let subnet: SubnetManager = ctx.contract(&client, opts.contract.as_deref(), ContractKey::Subnet)?;
    let tx_signer = signer.signer(ctx)?;
    let owner = tx_signer.address();

    let lock_cost = fetch("network lock cost", subnet.network_lock_cost()).await?;
    let token_address = fetch("HETU token", subnet.hetu_token()).await?;
    let whetu: Erc20 = ctx.contract_at(&client, token_address)?;
    let decimals = u32::from(fetch("token decimals", whetu.decimals()).await?);
    let balance = fetch("WHETU balance", whetu.balance_of(owner)).await?;

    print_info(&format!(
        "Lock cost: {} WHETU, balance: {} WHETU",
        format_amount(lock_cost, decimals),
        format_amount(balance, decimals)
    ));
    if balance < lock_cost {
        anyhow::bail!(
            "Insufficient WHETU balance: have {}, need {}. Wrap HETU first with `hetucli whetu deposit`",
            format_amount(balance, decimals),
            format_amount(lock_cost, decimals)
        );
    }

    ensure_allowance(
        ctx,
        &client,
        &tx_signer,
        &whetu,
        subnet.address(),
        lock_cost,
        decimals,
    )
    .await?;

    let netuid = fetch("next netuid", subnet.next_netuid()).await?;
    print_info(&format!("Registering subnet '{}' as netuid {}", name, netuid));
    let call = subnet
        .register_network(name, description, token_name, token_symbol)?
        .with_label("Register network");
    ctx.run_transaction(&client, &tx_signer, call).await?;
    print_success(&format!("Subnet registered with netuid {}", netuid));
    Ok(())
}

async fn update_subnet_params(
    ctx: &CommandContext,
    signer: &SignerOpts,
    opts: &ContractOpts,
    netuid: u16,
    params_json: Option<&str>,
    params_file: Option<&std::path::Path>,
) -> anyhow::Result<()> {
    let overrides = read_json_source(params_json, params_file)?;
    let overrides = overrides
        .as_object()
        .ok_or_else(|| anyhow::anyhow!("Hyperparameters must be a JSON object"))?;

    let client = ctx.rpc_client(opts.rpc.as_deref())?;
    let subnet: SubnetManager = ctx.contract(&client, opts.contract.as_deref(), ContractKey::Subnet)?;
    let tx_signer = signer.signer(ctx)?;

    let current = fetch("subnet params", subnet.subnet_params(netuid)).await?;
    let updated = current.with_overrides(overrides)?;
    if updated == current {
        print_info("Hyperparameters unchanged, nothing to submit");
        return Ok(());
    }

    let mut table = create_table_with_headers(&["Parameter", "Current", "New"]);
    for ((key, old), (_, new)) in current.entries().into_iter().zip(updated.entries()) {
        if old != new {
            table.add_row(vec![key.to_string(), old, new]);
        }
    }
    println!("{table}");

    let call = subnet
        .update_subnet_hyperparams(netuid, &updated)?
        .with_label("Update subnet params");
    ctx.run_transaction(&client, &tx_signer, call).await?;
    Ok(())
}

fn subnet_info_rows(info: &SubnetInfo) -> Vec<(&'static str, String)> {
    vec![
        ("Netuid", info.netuid.to_string()),
        ("Name", info.name.clone()),
        ("Description", info.description.clone()),
        ("Owner", checksum(&info.owner)),
        ("Alpha token", checksum(&info.alpha_token)),
        ("AMM pool", checksum(&info.amm_pool)),
        ("Locked", format_hetu_with_symbol(info.locked_amount)),
        ("Pool initial HETU", format_hetu_with_symbol(info.pool_initial_tao)),
        ("Burned", format_hetu_with_symbol(info.burned_amount)),
        ("Created at", info.created_at.to_string()),
        ("Active", info.is_active.to_string()),
    ]
}

fn print_subnet_info(info: &SubnetInfo) {
    println!("{}", create_field_table(&subnet_info_rows(info)));
}

fn print_hyperparams(netuid: u16, params: &SubnetHyperparams) {
    println!("Hyperparameters of subnet {}:", netuid);
    println!("{}", create_field_table(&params.entries()));
}

fn print_details(details: &SubnetDetails) {
    print_subnet_info(&details.info);
    print_hyperparams(details.info.netuid, &details.params);
    let pool = vec![
        ("Current price", format_hetu(details.current_price)),
        ("Total volume", format_hetu(details.total_volume)),
        ("HETU reserve", format_hetu(details.hetu_reserve)),
        ("Alpha reserve", format_hetu(details.alpha_reserve)),
    ];
    println!("Pool:");
    println!("{}", create_field_table(&pool));
}

#[cfg(test)]
mod tests {
    use crate::cli::{Cli, Commands};
    use crate::utils::balance::parse_hetu;
    use clap::{CommandFactory, Parser};
    use ethers_core::types::U256;

    use super::SubnetCommands;

    #[test]
    fn test_min_lock_is_hetu_decimal() {
        let cli = Cli::try_parse_from([
            "hetucli",
            "subnet",
            "update-network-params",
            "--min-lock",
            "100.5",
            "--rate-limit",
            "10",
            "--reduction-interval",
            "20",
        ])
        .unwrap();
        let min_lock = match cli.command {
            Commands::Subnet(cmd) => match cmd.command {
                SubnetCommands::UpdateNetworkParams { min_lock, .. } => min_lock,
                _ => panic!("wrong subcommand"),
            },
            _ => panic!("wrong command"),
        };
        assert_eq!(parse_hetu(&min_lock).unwrap(), U256::exp10(17) * 1005);

        let mut command = Cli::command();
        let help = command
            .find_subcommand_mut("subnet")
            .and_then(|c| c.find_subcommand_mut("update-network-params"))
            .map(|c| c.render_long_help().to_string())
            .unwrap();
        assert!(help.contains("--min-lock <HETU>"));
        assert!(help.contains("sent on chain in wei"));
    }
}
