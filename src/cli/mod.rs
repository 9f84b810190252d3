//! Command line interface (`hetucli`)
//!
//! # Commands
//!
//! - `wallet` - Keystore creation, import, unlock, export, listing and balance
//! - `tx` - Native HETU transfers
//! - `contract` - Call any function of a contract from its ABI
//! - `subnet` - Subnet registry queries and management
//! - `amm` - Subnet pool queries, liquidity and swaps
//! - `dendron` - Neuron registration and lookups
//! - `weights` - Validator weight submission
//! - `hetu` - Native balance lookups
//! - `stake` - Global staking and subnet allocation
//! - `whetu` - Wrapped HETU token operations

use crate::config::{CliOverrides, Config};
use crate::logging::{init_logging, LoggingConfig};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;
pub mod context;
pub mod utils;

pub use context::CommandContext;

/// Hetu chain command line client
#[derive(Parser)]
#[command(name = "hetucli")]
#[command(version)]
#[command(about = "Hetu chain command line client", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the config file (default ~/.hetucli/config.yml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Chain endpoint
    #[arg(long, global = true)]
    pub chain: Option<String>,

    /// Network name
    #[arg(long, global = true)]
    pub network: Option<String>,

    /// Disable caching
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// Hotkey name
    #[arg(long, global = true)]
    pub wallet_hotkey: Option<String>,

    /// Coldkey name
    #[arg(long, global = true)]
    pub wallet_name: Option<String>,

    /// Directory holding keystore files
    #[arg(long, global = true)]
    pub wallet_path: Option<String>,

    /// JSON-RPC endpoint
    #[arg(long, global = true)]
    pub json_rpc: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

impl Cli {
    /// Command line values that override the config file.
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            chain: self.chain.clone(),
            json_rpc: self.json_rpc.clone(),
            network: self.network.clone(),
            no_cache: self.no_cache.then_some(true),
            wallet_hotkey: self.wallet_hotkey.clone(),
            wallet_name: self.wallet_name.clone(),
            wallet_path: self.wallet_path.clone(),
        }
    }
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Wallet operations (create, unlock, list, export, balance)
    #[command(alias = "w")]
    Wallet(commands::wallet::WalletCommand),

    /// Send native HETU
    Tx(commands::tx::TxCommand),

    /// Generic contract calls from an ABI file
    Contract(commands::contract::ContractCommand),

    /// Subnet registry operations
    #[command(alias = "sn")]
    Subnet(commands::subnet::SubnetCommand),

    /// Subnet AMM operations
    Amm(commands::amm::AmmCommand),

    /// Dendron (neuron) registration and queries
    Dendron(commands::dendron::DendronCommand),

    /// Weight operations
    #[command(alias = "wt")]
    Weights(commands::weights::WeightsCommand),

    /// Native HETU queries
    Hetu(commands::hetu::HetuCommand),

    /// Global staking operations
    #[command(alias = "s")]
    Stake(commands::stake::StakeCommand),

    /// Wrapped HETU (WHETU) operations
    Whetu(commands::whetu::WhetuCommand),
}

/// Run the CLI application
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&LoggingConfig::from_env().with_verbosity(cli.verbose));

    let config = Config::load(cli.config.as_deref(), &cli.overrides())
        .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
    tracing::debug!(json_rpc = %config.json_rpc, wallet_path = %config.wallet_path, "Loaded config");

    dispatch(cli.command, &CommandContext::new(config)).await
}

/// Execute `command` against `ctx`.
pub async fn dispatch(command: Commands, ctx: &CommandContext) -> anyhow::Result<()> {
    match command {
        Commands::Wallet(cmd) => commands::wallet::execute(cmd, ctx).await,
        Commands::Tx(cmd) => commands::tx::execute(cmd, ctx).await,
        Commands::Contract(cmd) => commands::contract::execute(cmd, ctx).await,
        Commands::Subnet(cmd) => commands::subnet::execute(cmd, ctx).await,
        Commands::Amm(cmd) => commands::amm::execute(cmd, ctx).await,
        Commands::Dendron(cmd) => commands::dendron::execute(cmd, ctx).await,
        Commands::Weights(cmd) => commands::weights::execute(cmd, ctx).await,
        Commands::Hetu(cmd) => commands::hetu::execute(cmd, ctx).await,
        Commands::Stake(cmd) => commands::stake::execute(cmd, ctx).await,
        Commands::Whetu(cmd) => commands::whetu::execute(cmd, ctx).await,
    }
}
