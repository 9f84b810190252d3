//! Wallet commands for managing keystore accounts.

use crate::cli::context::CommandContext;
use crate::cli::utils::{
    password_or_prompt, print_info, print_success, print_warning, prompt_new_password, spinner,
};
use crate::utils::address::checksum;
use crate::utils::balance::format_hetu_with_symbol;
use clap::{Args, Subcommand};

/// Wallet command container
#[derive(Args, Clone)]
pub struct WalletCommand {
    #[command(subcommand)]
    pub command: WalletCommands,
}

/// Available wallet operations
#[derive(Subcommand, Clone)]
pub enum WalletCommands {
    /// Create a new encrypted keystore
    Create {
        /// Keystore password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Import a private key into a new keystore
    Import {
        /// Hex private key (0x optional)
        private_key: String,
        /// Keystore password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Decrypt a keystore to check the password
    Unlock {
        /// Keystore name or address
        wallet: String,
        /// Keystore password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// List keystores in the wallet directory
    List,

    /// Print the private key of a keystore
    ExportPrivkey {
        /// Keystore name or address
        wallet: String,
        /// Keystore password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Show the native HETU balance of a wallet or address
    Balance {
        /// Keystore name or address
        wallet: String,
        /// JSON-RPC endpoint override
        #[arg(long)]
        rpc: Option<String>,
    },
}

/// Execute wallet commands
pub async fn execute(cmd: WalletCommand, ctx: &CommandContext) -> anyhow::Result<()> {
    match cmd.command {
        WalletCommands::Create { password } => create_wallet(ctx, password),
        WalletCommands::Import {
            private_key,
            password,
        } => import_wallet(ctx, &private_key, password),
        WalletCommands::Unlock { wallet, password } => unlock_wallet(ctx, &wallet, password),
        WalletCommands::List => list_wallets(ctx),
        WalletCommands::ExportPrivkey { wallet, password } => {
            export_private_key(ctx, &wallet, password)
        }
        WalletCommands::Balance { wallet, rpc } => balance(ctx, &wallet, rpc.as_deref()).await,
    }
}

fn new_password(password: Option<String>) -> anyhow::Result<String> {
    match password {
        Some(p) => Ok(p),
        None => prompt_new_password("Keystore password"),
    }
}

fn create_wallet(ctx: &CommandContext, password: Option<String>) -> anyhow::Result<()> {
    let store = ctx.keystore();
    let password = new_password(password)?;

    let created = store
        .create(&password)
        .map_err(|e| anyhow::anyhow!("Failed to create wallet: {}", e))?;

    print_success("Wallet created");
    println!("Address: {}", checksum(&created.address));
    println!("Keystore: {}", created.path.display());
    Ok(())
}

fn import_wallet(ctx: &CommandContext, private_key: &str, password: Option<String>) -> anyhow::Result<()> {
    let store = ctx.keystore();
    let password = new_password(password)?;

    let created = store
        .import(private_key, &password)
        .map_err(|e| anyhow::anyhow!("Failed to import key: {}", e))?;

    print_success(&format!("Imported address: {}", checksum(&created.address)));
    println!("Keystore: {}", created.path.display());
    Ok(())
}

fn unlock_wallet(ctx: &CommandContext, wallet: &str, password: Option<String>) -> anyhow::Result<()> {
    let store = ctx.keystore();
    store.load(wallet)?;
    let password = password_or_prompt(password, &format!("Password for {}", wallet))?;
    let unlocked = store.unlock(wallet, &password)?;
    print_success(&format!("Unlocked address: {}", checksum(&unlocked.address())));
    Ok(())
}

fn list_wallets(ctx: &CommandContext) -> anyhow::Result<()> {
    let store = ctx.keystore();
    if !store.dir().is_dir() {
        print_warning(&format!("No wallet directory found at {}", store.dir().display()));
        return Ok(());
    }

    let names = store.list()?;
    if names.is_empty() {
        print_warning(&format!("No keystore files found in {}", store.dir().display()));
        return Ok(());
    }

    println!("Wallets in {}:", store.dir().display());
    for name in names {
        println!("  - {}", name);
    }
    Ok(())
}

fn export_private_key(ctx: &CommandContext, wallet: &str, password: Option<String>) -> anyhow::Result<()> {
    let store = ctx.keystore();
    store.load(wallet)?;
    let password = password_or_prompt(password, &format!("Password for {}", wallet))?;
    let key = store.export_private_key(wallet, &password)?;

    print_warning("Anyone holding this key controls the account");
    println!("Private key (hex): {}", key.as_str());
    Ok(())
}

async fn balance(ctx: &CommandContext, wallet: &str, rpc: Option<&str>) -> anyhow::Result<()> {
    let address = ctx.resolve_account(wallet)?;
    let client = ctx.rpc_client(rpc)?;

    let pb = spinner("Fetching balance...");
    let result = client.get_balance(address).await;
    pb.finish_and_clear();
    let wei = result.map_err(|e| anyhow::anyhow!("Failed to fetch balance: {}", e))?;

    print_info(&format!("Address: {}", checksum(&address)));
    println!("Balance: {}", format_hetu_with_symbol(wei));
    Ok(())
}
