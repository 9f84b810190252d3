//! Subnet AMM commands.

use super::{ensure_allowance, fetch, SignerOpts};
use crate::cli::context::CommandContext;
use crate::cli::utils::{create_field_table, print_info, print_success, print_warning};
use crate::chain::RpcClient;
use crate::config::ContractKey;
use crate::contracts::amm::SwapSimulation;
use crate::contracts::{ContractWrapper, Erc20, PoolInfo, SubnetAmm, SubnetManager};
use crate::core::constants::{APPROVAL_CHECK_SWAP_HETU, HETU_DECIMALS};
use crate::utils::address::{checksum, is_zero_address};
use crate::utils::balance::{format_hetu, parse_hetu};
use clap::{Args, Subcommand};
use ethers_core::types::{Address, U256};

/// Which pool to talk to.
#[derive(Args, Clone, Debug, Default)]
pub struct AmmOpts {
    /// Pool address
    #[arg(long, conflicts_with = "netuid")]
    pub contract: Option<String>,
    /// Look the pool up from the subnet registry
    #[arg(long)]
    pub netuid: Option<u16>,
    /// Subnet registry address used with --netuid
    #[arg(long)]
    pub subnet_contract: Option<String>,
    /// JSON-RPC endpoint override
    #[arg(long)]
    pub rpc: Option<String>,
}

#[derive(Args, Clone)]
pub struct AmmCommand {
    #[command(subcommand)]
    pub command: AmmCommands,
}

#[derive(Subcommand, Clone)]
pub enum AmmCommands {
    /// Current alpha price in HETU
    AlphaPrice {
        #[command(flatten)]
        opts: AmmOpts,
    },

    /// Pool reserves and prices
    PoolInfo {
        #[command(flatten)]
        opts: AmmOpts,
    },

    /// Pool statistics
    Statistics {
        #[command(flatten)]
        opts: AmmOpts,
    },

    /// Preview a swap without sending it
    SwapPreview {
        /// Input amount
        #[arg(long)]
        amount: String,
        /// Swap HETU for alpha (default: alpha for HETU)
        #[arg(long)]
        hetu_to_alpha: bool,
        #[command(flatten)]
        opts: AmmOpts,
    },

    /// Simulate selling alpha for HETU
    SimSwapAlphaForHetu {
        /// Alpha amount
        #[arg(long)]
        amount: String,
        #[command(flatten)]
        opts: AmmOpts,
    },

    /// Simulate buying alpha with HETU
    SimSwapHetuForAlpha {
        /// HETU amount
        #[arg(long)]
        amount: String,
        #[command(flatten)]
        opts: AmmOpts,
    },

    /// Add HETU and alpha to the pool
    InjectLiquidity {
        #[command(flatten)]
        signer: SignerOpts,
        #[arg(long)]
        hetu_amount: String,
        #[arg(long)]
        alpha_amount: String,
        #[command(flatten)]
        opts: AmmOpts,
    },

    /// Remove HETU and alpha from the pool
    WithdrawLiquidity {
        #[command(flatten)]
        signer: SignerOpts,
        #[arg(long)]
        hetu_amount: String,
        #[arg(long)]
        alpha_amount: String,
        /// Recipient (defaults to the sender)
        #[arg(long)]
        to: Option<String>,
        #[command(flatten)]
        opts: AmmOpts,
    },

    /// Sell alpha for HETU
    SwapAlphaForHetu {
        #[command(flatten)]
        signer: SignerOpts,
        /// Alpha amount
        #[arg(long)]
        amount: String,
        /// Minimum HETU received
        #[arg(long, default_value = "0")]
        min_out: String,
        /// Recipient (defaults to the sender)
        #[arg(long)]
        to: Option<String>,
        #[command(flatten)]
        opts: AmmOpts,
    },

    /// Buy alpha with HETU
    SwapHetuForAlpha {
        #[command(flatten)]
        signer: SignerOpts,
        /// HETU amount
        #[arg(long)]
        amount: String,
        /// Minimum alpha received
        #[arg(long, default_value = "0")]
        min_out: String,
        /// Recipient (defaults to the sender)
        #[arg(long)]
        to: Option<String>,
        #[command(flatten)]
        opts: AmmOpts,
    },

    /// Approve the pool to spend WHETU and alpha
    ApproveTokens {
        #[command(flatten)]
        signer: SignerOpts,
        #[arg(long, default_value = "0")]
        hetu_amount: String,
        #[arg(long, default_value = "0")]
        alpha_amount: String,
        #[command(flatten)]
        opts: AmmOpts,
    },

    /// Balances, allowances and pool liquidity for an account
    CheckApproval {
        /// Keystore name or address
        #[arg(long)]
        user: String,
        #[command(flatten)]
        opts: AmmOpts,
    },

    /// Pool state summary
    PoolStatus {
        #[command(flatten)]
        opts: AmmOpts,
    },
}

pub async fn execute(cmd: AmmCommand, ctx: &CommandContext) -> anyhow::Result<()> {
    match cmd.command {
        AmmCommands::AlphaPrice { opts } => {
            let (_, amm) = connect(ctx, &opts).await?;
            let price = fetch("alpha price", amm.alpha_price()).await?;
            println!("Alpha price: {} HETU", format_hetu(price));
            Ok(())
        }
        AmmCommands::PoolInfo { opts } => {
            let (_, amm) = connect(ctx, &opts).await?;
            let pool = fetch("pool info", amm.pool_info()).await?;
            print_pool(&pool);
            Ok(())
        }
        AmmCommands::Statistics { opts } => {
            let (_, amm) = connect(ctx, &opts).await?;
            let stats = fetch("pool statistics", amm.statistics()).await?;
            let rows = vec![
                ("Current price", format_hetu(stats.current_price)),
                ("Moving price", format_hetu(stats.moving_price)),
                ("Total volume", format_hetu(stats.total_volume)),
                ("HETU reserve", format_hetu(stats.hetu_reserve)),
                ("Alpha reserve", format_hetu(stats.alpha_reserve)),
                ("Alpha issued", format_hetu(stats.alpha_issued)),
            ];
            println!("{}", create_field_table(&rows));
            Ok(())
        }
        AmmCommands::SwapPreview {
            amount,
            hetu_to_alpha,
            opts,
        } => {
            let amount_in = parse_hetu(&amount)?;
            let (_, amm) = connect(ctx, &opts).await?;
            let preview = fetch("swap preview", amm.swap_preview(amount_in, hetu_to_alpha)).await?;
            let (from, to) = direction(hetu_to_alpha);
            let rows = vec![
                ("Input", format!("{} {}", amount, from)),
                ("Output", format!("{} {}", format_hetu(preview.amount_out), to)),
                ("Price impact", preview.price_impact.to_string()),
                ("New price", format_hetu(preview.new_price)),
                ("Valid", preview.is_valid.to_string()),
            ];
            println!("{}", create_field_table(&rows));
            if !preview.is_valid {
                print_warning("The pool rejects this swap");
            }
            Ok(())
        }
        AmmCommands::SimSwapAlphaForHetu { amount, opts } => {
            let amount_in = parse_hetu(&amount)?;
            let (_, amm) = connect(ctx, &opts).await?;
            let out = fetch("swap simulation", amm.sim_swap_alpha_for_hetu(amount_in)).await?;
            println!("{} alpha -> {} HETU", amount, format_hetu(out));
            if out.is_zero() {
                print_warning("Simulation returned zero: insufficient liquidity");
            }
            Ok(())
        }
        AmmCommands::SimSwapHetuForAlpha { amount, opts } => {
            let amount_in = parse_hetu(&amount)?;
            let (_, amm) = connect(ctx, &opts).await?;
            let out = fetch("swap simulation", amm.sim_swap_hetu_for_alpha(amount_in)).await?;
            println!("{} HETU -> {} alpha", amount, format_hetu(out));
            if out.is_zero() {
                print_warning("Simulation returned zero: insufficient liquidity");
            }
            Ok(())
        }
        AmmCommands::InjectLiquidity {
            signer,
            hetu_amount,
            alpha_amount,
            opts,
        } => {
            let hetu = parse_hetu(&hetu_amount)?;
            let alpha = parse_hetu(&alpha_amount)?;
            let (client, amm) = connect(ctx, &opts).await?;
            let tx_signer = signer.signer(ctx)?;
            let (hetu_token, alpha_token) = tokens(ctx, &client, &amm).await?;
            ensure_allowance(ctx, &client, &tx_signer, &hetu_token, amm.address(), hetu, HETU_DECIMALS).await?;
            ensure_allowance(ctx, &client, &tx_signer, &alpha_token, amm.address(), alpha, HETU_DECIMALS).await?;
            let call = amm.inject_liquidity(hetu, alpha)?.with_label("Inject liquidity");
            ctx.run_transaction(&client, &tx_signer, call).await?;
            Ok(())
        }
        AmmCommands::WithdrawLiquidity {
            signer,
            hetu_amount,
            alpha_amount,
            to,
            opts,
        } => {
            let hetu = parse_hetu(&hetu_amount)?;
            let alpha = parse_hetu(&alpha_amount)?;
            let (client, amm) = connect(ctx, &opts).await?;
            let tx_signer = signer.signer(ctx)?;
            let to = recipient(ctx, to.as_deref(), tx_signer.address())?;
            let call = amm
                .withdraw_liquidity(hetu, alpha, to)?
                .with_label("Withdraw liquidity");
            ctx.run_transaction(&client, &tx_signer, call).await?;
            Ok(())
        }
        AmmCommands::SwapAlphaForHetu {
            signer,
            amount,
            min_out,
            to,
            opts,
        } => {
            let amount_in = parse_hetu(&amount)?;
            let min_out = parse_hetu(&min_out)?;
            let (client, amm) = connect(ctx, &opts).await?;
            let tx_signer = signer.signer(ctx)?;
            let to = recipient(ctx, to.as_deref(), tx_signer.address())?;
            let (_, alpha_token) = tokens(ctx, &client, &amm).await?;
            ensure_allowance(ctx, &client, &tx_signer, &alpha_token, amm.address(), amount_in, HETU_DECIMALS).await?;
            let call = amm
                .swap_alpha_for_hetu(amount_in, min_out, to)?
                .with_label("Swap alpha for HETU");
            ctx.run_transaction(&client, &tx_signer, call).await?;
            Ok(())
        }
        AmmCommands::SwapHetuForAlpha {
            signer,
            amount,
            min_out,
            to,
            opts,
        } => {
            let amount_in = parse_hetu(&amount)?;
            let min_out = parse_hetu(&min_out)?;
            let (client, amm) = connect(ctx, &opts).await?;
            let tx_signer = signer.signer(ctx)?;
            let to = recipient(ctx, to.as_deref(), tx_signer.address())?;
            let (hetu_token, _) = tokens(ctx, &client, &amm).await?;
            ensure_allowance(ctx, &client, &tx_signer, &hetu_token, amm.address(), amount_in, HETU_DECIMALS).await?;
            let call = amm
                .swap_hetu_for_alpha(amount_in, min_out, to)?
                .with_label("Swap HETU for alpha");
            ctx.run_transaction(&client, &tx_signer, call).await?;
            Ok(())
        }
        AmmCommands::ApproveTokens {
            signer,
            hetu_amount,
            alpha_amount,
            opts,
        } => {
            let hetu = parse_hetu(&hetu_amount)?;
            let alpha = parse_hetu(&alpha_amount)?;
            let (client, amm) = connect(ctx, &opts).await?;
            let tx_signer = signer.signer(ctx)?;
            let (hetu_token, alpha_token) = tokens(ctx, &client, &amm).await?;
            if !hetu.is_zero() {
                let call = hetu_token.approve(amm.address(), hetu)?.with_label("Approve WHETU");
                ctx.run_transaction(&client, &tx_signer, call).await?;
            }
            if !alpha.is_zero() {
                let call = alpha_token.approve(amm.address(), alpha)?.with_label("Approve alpha");
                ctx.run_transaction(&client, &tx_signer, call).await?;
            }
            if hetu.is_zero() && alpha.is_zero() {
                print_warning("Nothing to approve, pass --hetu-amount or --alpha-amount");
            }
            Ok(())
        }
        AmmCommands::CheckApproval { user, opts } => check_approval(ctx, &user, &opts).await,
        AmmCommands::PoolStatus { opts } => pool_status(ctx, &opts).await,
    }
}

/// Resolve the pool address from `--contract` or `--netuid` and bind the AMM wrapper.
async fn connect(ctx: &CommandContext, opts: &AmmOpts) -> anyhow::Result<(RpcClient, SubnetAmm)> {
    let client = ctx.rpc_client(opts.rpc.as_deref())?;
    let amm: SubnetAmm = match (opts.contract.as_deref(), opts.netuid) {
        (Some(_), Some(_)) => anyhow::bail!("--contract and --netuid are mutually exclusive"),
        (None, Some(netuid)) => {
            let subnet: SubnetManager =
                ctx.contract(&client, opts.subnet_contract.as_deref(), ContractKey::Subnet)?;
            let info = fetch("subnet info", subnet.subnet_info(netuid)).await?;
            if is_zero_address(&info.amm_pool) {
                anyhow::bail!("Subnet {} has no AMM pool", netuid);
            }
            print_info(&format!("Using contract address: {}", checksum(&info.amm_pool)));
            ctx.contract_at(&client, info.amm_pool)?
        }
        (Some(address), None) => ctx.contract(&client, Some(address), ContractKey::Amm)?,
        (None, None) => anyhow::bail!("Must specify either --contract or --netuid"),
    };
    Ok((client, amm))
}

async fn tokens(ctx: &CommandContext, client: &RpcClient, amm: &SubnetAmm) -> anyhow::Result<(Erc20, Erc20)> {
    let hetu = fetch("HETU token", amm.hetu_token()).await?;
    let alpha = fetch("alpha token", amm.alpha_token()).await?;
    Ok((ctx.contract_at(client, hetu)?, ctx.contract_at(client, alpha)?))
}

fn recipient(ctx: &CommandContext, to: Option<&str>, sender: Address) -> anyhow::Result<Address> {
    match to {
        Some(to) => ctx.resolve_account(to),
        None => Ok(sender),
    }
}

fn direction(hetu_to_alpha: bool) -> (&'static str, &'static str) {
    if hetu_to_alpha {
        ("HETU", "alpha")
    } else {
        ("alpha", "HETU")
    }
}

fn print_pool(pool: &PoolInfo) {
    let rows = vec![
        ("Mechanism", pool.mechanism_name().to_string()),
        ("HETU reserve", format_hetu(pool.subnet_tao)),
        ("Alpha in pool", format_hetu(pool.subnet_alpha_in)),
        ("Alpha outstanding", format_hetu(pool.subnet_alpha_out)),
        ("Current price", format_hetu(pool.current_price)),
        ("Moving price", format_hetu(pool.moving_price)),
        ("Total volume", format_hetu(pool.total_volume)),
        ("Minimum liquidity", format_hetu(pool.minimum_liquidity)),
    ];
    println!("{}", create_field_table(&rows));
}

/// Line reported for the simulated swap of `amount` HETU.
pub(crate) fn describe_simulation(amount: &str, simulation: &SwapSimulation) -> String {
    match simulation {
        SwapSimulation::Quote(out) => format!(
            "Simulated swap of {} HETU returns {} alpha",
            amount,
            format_hetu(*out)
        ),
        SwapSimulation::InsufficientLiquidity => format!(
            "Simulated swap of {} HETU failed: insufficient liquidity",
            amount
        ),
    }
}

async fn check_approval(ctx: &CommandContext, user: &str, opts: &AmmOpts) -> anyhow::Result<()> {
    let user = ctx.resolve_account(user)?;
    let (client, amm) = connect(ctx, opts).await?;
    let (hetu_token, alpha_token) = tokens(ctx, &client, &amm).await?;
    let spender = amm.address();

    let hetu_balance = fetch("WHETU balance", hetu_token.balance_of(user)).await?;
    let hetu_allowance = fetch("WHETU allowance", hetu_token.allowance(user, spender)).await?;
    let alpha_balance = fetch("alpha balance", alpha_token.balance_of(user)).await?;
    let alpha_allowance = fetch("alpha allowance", alpha_token.allowance(user, spender)).await?;

    let rows = vec![
        ("Account", checksum(&user)),
        ("Pool", checksum(&spender)),
        ("WHETU token", checksum(&hetu_token.address())),
        ("WHETU balance", format_hetu(hetu_balance)),
        ("WHETU allowance", format_hetu(hetu_allowance)),
        ("Alpha token", checksum(&alpha_token.address())),
        ("Alpha balance", format_hetu(alpha_balance)),
        ("Alpha allowance", format_hetu(alpha_allowance)),
    ];
    println!("{}", create_field_table(&rows));

    let pool = fetch("pool info", amm.pool_info()).await?;
    print_pool(&pool);

    let probe = parse_hetu(APPROVAL_CHECK_SWAP_HETU)?;
    let simulation = SwapSimulation::from_result(amm.sim_swap_hetu_for_alpha(probe).await);
    let line = describe_simulation(APPROVAL_CHECK_SWAP_HETU, &simulation);
    match simulation {
        SwapSimulation::Quote(_) => print_success(&line),
        SwapSimulation::InsufficientLiquidity => print_warning(&line),
    }

    for (ok, line) in swap_readiness(hetu_balance, hetu_allowance, probe) {
        if ok {
            print_success(&line);
        } else {
            print_warning(&line);
        }
    }
    if hetu_allowance < probe {
        print_info("Run `hetucli amm approve-tokens` to raise the WHETU allowance");
    }
    Ok(())
}

/// Balance and allowance checks for a swap of `amount` WHETU.
pub(crate) fn swap_readiness(balance: U256, allowance: U256, amount: U256) -> Vec<(bool, String)> {
    let check = |ok: bool, what: &str| {
        let verdict = if ok { "Sufficient" } else { "Insufficient" };
        (ok, format!("{} WHETU {} for a {} HETU swap", verdict, what, format_hetu(amount)))
    };
    vec![check(balance >= amount, "balance"), check(allowance >= amount, "allowance")]
}

/// Initialization and trading lines for `pool-status`.
pub(crate) fn pool_readiness(pool: &PoolInfo) -> Vec<(bool, String)> {
    let mut lines = Vec::new();
    if pool.is_initialized() {
        lines.push((true, "Pool is properly initialized".to_string()));
    } else {
        lines.push((
            false,
            format!(
                "Pool needs initialization: minimum liquidity {}, HETU reserve {}, alpha reserve {}",
                format_hetu(pool.minimum_liquidity),
                format_hetu(pool.subnet_tao),
                format_hetu(pool.subnet_alpha_in)
            ),
        ));
    }
    if pool.is_empty() {
        lines.push((false, "Trading is not possible: insufficient liquidity".to_string()));
    } else {
        lines.push((true, "Trading is possible".to_string()));
    }
    lines
}

async fn pool_status(ctx: &CommandContext, opts: &AmmOpts) -> anyhow::Result<()> {
    let (_, amm) = connect(ctx, opts).await?;
    let (system, subnet_contract) = fetch("system info", amm.system_info()).await?;
    let creator = fetch("creator info", amm.creator_info()).await?;
    let pool = fetch("pool info", amm.pool_info()).await?;
    let hetu_token = fetch("HETU token", amm.hetu_token()).await?;
    let alpha_token = fetch("alpha token", amm.alpha_token()).await?;

    let rows = vec![
        ("Pool", checksum(&amm.address())),
        ("System address", checksum(&system)),
        ("Subnet contract", checksum(&subnet_contract)),
        ("Creator", checksum(&creator.creator)),
        ("Created at", creator.created_at.to_string()),
        ("Netuid", creator.netuid.to_string()),
        ("HETU token", checksum(&hetu_token)),
        ("Alpha token", checksum(&alpha_token)),
    ];
    println!("{}", create_field_table(&rows));
    print_pool(&pool);

    for (ok, line) in pool_readiness(&pool) {
        if ok {
            print_success(&line);
        } else {
            print_warning(&line);
        }
    }
    Ok(())
}
