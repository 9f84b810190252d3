//! Generic contract calls driven by an ABI file.

use crate::cli::context::CommandContext;
use crate::cli::utils::{print_info, print_success, spinner};
use crate::config::expand_home;
use crate::contracts::args::{format_outputs, parse_call_args};
use crate::contracts::{load_abi_file, ContractHandle};
use crate::core::constants::GAS_CONTRACT_CALL;
use crate::utils::address::parse_address;
use crate::utils::balance::parse_hetu;
use clap::{Args, Subcommand};
use ethers_core::abi::StateMutability;

#[derive(Args, Clone)]
pub struct ContractCommand {
    #[command(subcommand)]
    pub command: ContractCommands,
}

#[derive(Subcommand, Clone)]
pub enum ContractCommands {
    /// Call a function. View functions are read, others are sent as transactions.
    Call {
        /// Contract address
        #[arg(long)]
        address: String,
        /// Path to the contract ABI JSON
        #[arg(long)]
        abi_path: String,
        /// Function name
        #[arg(long)]
        function: String,
        /// Comma separated arguments; arrays as [a,b], tuples as (a,b)
        #[arg(long, allow_hyphen_values = true)]
        args: Option<String>,
        /// Sender keystore name or address (required for state-changing calls)
        #[arg(long)]
        sender: Option<String>,
        /// Raw private key for state-changing calls
        #[arg(long)]
        private_key: Option<String>,
        /// Keystore password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
        /// HETU to attach to payable calls
        #[arg(long)]
        value: Option<String>,
        /// Gas limit for state-changing calls
        #[arg(long, default_value_t = GAS_CONTRACT_CALL)]
        gas: u64,
        /// JSON-RPC endpoint override
        #[arg(long)]
        rpc: Option<String>,
    },
}

pub async fn execute(cmd: ContractCommand, ctx: &CommandContext) -> anyhow::Result<()> {
    match cmd.command {
        ContractCommands::Call {
            address,
            abi_path,
            function,
            args,
            sender,
            private_key,
            password,
            value,
            gas,
            rpc,
        } => {
            let abi = load_abi_file(&expand_home(&abi_path))?;
            let address = parse_address(&address)?;
            let client = ctx.rpc_client(rpc.as_deref())?;
            let handle = ContractHandle::new(address, client.clone(), &abi);

            let func = handle.function(&function)?.clone();
            let tokens = parse_call_args(&func, args.as_deref())?;

            let read_only = matches!(
                func.state_mutability,
                StateMutability::View | StateMutability::Pure
            );
            if read_only {
                let pb = spinner(&format!("Calling {}...", function));
                let result = handle.query(&function, &tokens).await;
                pb.finish_and_clear();
                let outputs = result.map_err(|e| anyhow::anyhow!("Failed to call {}: {}", function, e))?;
                print_success(&format!("Return value: {}", format_outputs(&outputs)));
                return Ok(());
            }

            let signer = ctx.signer(sender.as_deref(), private_key.as_deref(), password)?;
            let mut call = handle.call(&function, &tokens, gas)?;
            if let Some(value) = value.as_deref() {
                if func.state_mutability != StateMutability::Payable {
                    anyhow::bail!("{} is not payable", function);
                }
                call = call.with_value(parse_hetu(value)?);
            }
            print_info(&format!("Sending {} to {:?}", function, address));
            let receipt = ctx.run_transaction(&client, &signer, call).await?;
            println!("{}", receipt);
            Ok(())
        }
    }
}
