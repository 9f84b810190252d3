//! Native HETU queries.

use crate::cli::context::CommandContext;
use crate::cli::utils::{print_info, spinner};
use crate::utils::address::checksum;
use crate::utils::balance::format_hetu;
use clap::{Args, Subcommand};

#[derive(Args, Clone)]
pub struct HetuCommand {
    #[command(subcommand)]
    pub command: HetuCommands,
}

#[derive(Subcommand, Clone)]
pub enum HetuCommands {
    /// Native balance of an account
    BalanceOf {
        /// Keystore name or address
        account: String,
        /// JSON-RPC endpoint override
        #[arg(long)]
        rpc: Option<String>,
    },
}

pub async fn execute(cmd: HetuCommand, ctx: &CommandContext) -> anyhow::Result<()> {
    match cmd.command {
        HetuCommands::BalanceOf { account, rpc } => {
            let address = ctx.resolve_account(&account)?;
            let client = ctx.rpc_client(rpc.as_deref())?;

            let pb = spinner("Fetching balance...");
            let result = client.get_balance(address).await;
            pb.finish_and_clear();
            let wei = result.map_err(|e| anyhow::anyhow!("Failed to fetch balance: {}", e))?;

            print_info(&format!("Account: {}", checksum(&address)));
            println!("Native HETU Balance: {} HETU", format_hetu(wei));
            println!("Raw balance: {} wei", wei);
            Ok(())
        }
    }
}
