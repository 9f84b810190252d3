//! Dendron (neuron) commands.

use super::{ensure_allowance, fetch, SignerOpts};
use crate::chain::RpcClient;
use crate::cli::context::CommandContext;
use crate::cli::utils::{
    create_field_table, create_table_with_headers, print_error, print_info, print_success,
    print_warning, spinner,
};
use crate::config::ContractKey;
use crate::contracts::{
    ContractWrapper, DendronInfo, DendronManager, DendronRegistration, Erc20, GlobalStaking,
    SubnetManager,
};
use crate::core::constants::HETU_DECIMALS;
use crate::utils::address::checksum;
use crate::utils::balance::{format_hetu_with_symbol, parse_hetu};
use clap::{Args, Subcommand};
use ethers_core::types::{Address, U256};

/// Contract and endpoint overrides for dendron commands.
#[derive(Args, Clone, Debug, Default)]
pub struct DendronOpts {
    /// Dendron manager address
    #[arg(long)]
    pub contract: Option<String>,
    /// Subnet registry address
    #[arg(long)]
    pub subnet_contract: Option<String>,
    /// Global staking address
    #[arg(long)]
    pub staking_contract: Option<String>,
    /// JSON-RPC endpoint override
    #[arg(long)]
    pub rpc: Option<String>,
}

#[derive(Args, Clone)]
pub struct DendronCommand {
    #[command(subcommand)]
    pub command: DendronCommands,
}

#[derive(Subcommand, Clone)]
pub enum DendronCommands {
    /// Registration record of an account
    GetDendronInfo {
        #[arg(long)]
        netuid: u16,
        /// Keystore name or address
        #[arg(long)]
        account: String,
        #[command(flatten)]
        opts: DendronOpts,
    },

    /// Number of dendrons on a subnet
    GetSubnetDendronCount {
        #[arg(long)]
        netuid: u16,
        #[command(flatten)]
        opts: DendronOpts,
    },

    /// Dendron accounts on a subnet
    GetSubnetDendrons {
        #[arg(long)]
        netuid: u16,
        #[command(flatten)]
        opts: DendronOpts,
    },

    /// Number of validators on a subnet
    GetSubnetValidatorCount {
        #[arg(long)]
        netuid: u16,
        #[command(flatten)]
        opts: DendronOpts,
    },

    /// Validator accounts on a subnet
    GetSubnetValidators {
        #[arg(long)]
        netuid: u16,
        #[command(flatten)]
        opts: DendronOpts,
    },

    /// Whether an account is a registered dendron
    IsDendron {
        #[arg(long)]
        netuid: u16,
        #[arg(long)]
        account: String,
        #[command(flatten)]
        opts: DendronOpts,
    },

    /// Whether an account is a validator
    IsValidator {
        #[arg(long)]
        netuid: u16,
        #[arg(long)]
        account: String,
        #[command(flatten)]
        opts: DendronOpts,
    },

    /// Account at a position of the subnet's dendron list
    DendronList {
        #[arg(long)]
        netuid: u16,
        #[arg(long)]
        index: u64,
        #[command(flatten)]
        opts: DendronOpts,
    },

    /// Registration record of an account (public mapping)
    Dendrons {
        #[arg(long)]
        netuid: u16,
        #[arg(long)]
        account: String,
        #[command(flatten)]
        opts: DendronOpts,
    },

    /// Check whether an account can register on a subnet
    CanRegisterDendron {
        #[arg(long)]
        netuid: u16,
        #[arg(long)]
        account: String,
        /// Check against the validator threshold
        #[arg(long)]
        validator: bool,
        #[command(flatten)]
        opts: DendronOpts,
    },

    /// Register as a dendron or validator, allocating stake
    Regist {
        #[command(flatten)]
        signer: SignerOpts,
        #[arg(long)]
        netuid: u16,
        /// Register with the validator role
        #[arg(long)]
        validator: bool,
        /// Stake to allocate in HETU (defaults to the role threshold)
        #[arg(long)]
        stake: Option<String>,
        #[arg(long, default_value = "")]
        axon_endpoint: String,
        #[arg(long, default_value_t = 0)]
        axon_port: u32,
        #[arg(long, default_value = "")]
        prometheus_endpoint: String,
        #[arg(long, default_value_t = 0)]
        prometheus_port: u32,
        #[command(flatten)]
        opts: DendronOpts,
    },

    /// Deregister from a subnet
    DeregisterDendron {
        #[command(flatten)]
        signer: SignerOpts,
        #[arg(long)]
        netuid: u16,
        #[command(flatten)]
        opts: DendronOpts,
    },

    /// Role of an account on a subnet
    GetUserRole {
        #[arg(long)]
        netuid: u16,
        #[arg(long)]
        account: String,
        #[command(flatten)]
        opts: DendronOpts,
    },
}

pub async fn execute(cmd: DendronCommand, ctx: &CommandContext) -> anyhow::Result<()> {
    match cmd.command {
        DendronCommands::GetDendronInfo {
            netuid,
            account,
            opts,
        } => {
            let account = ctx.resolve_account(&account)?;
            let (_, dendron) = connect(ctx, &opts)?;
            let info = fetch("dendron info", dendron.dendron_info(netuid, account)).await?;
            print_dendron(&info);
            Ok(())
        }
        DendronCommands::GetSubnetDendronCount { netuid, opts } => {
            let (_, dendron) = connect(ctx, &opts)?;
            let count = fetch("dendron count", dendron.subnet_dendron_count(netuid)).await?;
            println!("Dendrons on subnet {}: {}", netuid, count);
            Ok(())
        }
        DendronCommands::GetSubnetDendrons { netuid, opts } => {
            let (_, dendron) = connect(ctx, &opts)?;
            let accounts = fetch("dendrons", dendron.subnet_dendrons(netuid)).await?;
            print_accounts("Dendron", netuid, &accounts);
            Ok(())
        }
        DendronCommands::GetSubnetValidatorCount { netuid, opts } => {
            let (_, dendron) = connect(ctx, &opts)?;
            let count = fetch("validator count", dendron.subnet_validator_count(netuid)).await?;
            println!("Validators on subnet {}: {}", netuid, count);
            Ok(())
        }
        DendronCommands::GetSubnetValidators { netuid, opts } => {
            let (_, dendron) = connect(ctx, &opts)?;
            let accounts = fetch("validators", dendron.subnet_validators(netuid)).await?;
            print_accounts("Validator", netuid, &accounts);
            Ok(())
        }
        DendronCommands::IsDendron {
            netuid,
            account,
            opts,
        } => {
            let account = ctx.resolve_account(&account)?;
            let (_, dendron) = connect(ctx, &opts)?;
            let yes = fetch("dendron status", dendron.is_dendron(netuid, account)).await?;
            println!("{} is dendron on subnet {}: {}", checksum(&account), netuid, yes);
            Ok(())
        }
        DendronCommands::IsValidator {
            netuid,
            account,
            opts,
        } => {
            let account = ctx.resolve_account(&account)?;
            let (_, dendron) = connect(ctx, &opts)?;
            let yes = fetch("validator status", dendron.is_validator(netuid, account)).await?;
            println!("{} is validator on subnet {}: {}", checksum(&account), netuid, yes);
            Ok(())
        }
        DendronCommands::DendronList {
            netuid,
            index,
            opts,
        } => {
            let (_, dendron) = connect(ctx, &opts)?;
            let account = fetch("dendron list", dendron.dendron_list(netuid, U256::from(index))).await?;
            println!("Dendron {} on subnet {}: {}", index, netuid, checksum(&account));
            Ok(())
        }
        DendronCommands::Dendrons {
            netuid,
            account,
            opts,
        } => {
            let account = ctx.resolve_account(&account)?;
            let (_, dendron) = connect(ctx, &opts)?;
            let info = fetch("dendron", dendron.dendrons(netuid, account)).await?;
            print_dendron(&info);
            Ok(())
        }
        DendronCommands::CanRegisterDendron {
            netuid,
            account,
            validator,
            opts,
        } => can_register(ctx, netuid, &account, validator, &opts).await,
        DendronCommands::Regist {
            signer,
            netuid,
            validator,
            stake,
            axon_endpoint,
            axon_port,
            prometheus_endpoint,
            prometheus_port,
            opts,
        } => {
            let registration = DendronRegistration {
                netuid,
                stake_amount: U256::zero(),
                is_validator: validator,
                axon_endpoint,
                axon_port,
                prometheus_endpoint,
                prometheus_port,
            };
            register(ctx, &signer, &opts, registration, stake.as_deref()).await
        }
        DendronCommands::DeregisterDendron {
            signer,
            netuid,
            opts,
        } => {
            let (client, dendron) = connect(ctx, &opts)?;
            let tx_signer = signer.signer(ctx)?;
            let info = fetch(
                "dendron info",
                dendron.dendron_info(netuid, tx_signer.address()),
            )
            .await?;
            if !info.is_active {
                anyhow::bail!(
                    "{} is not an active dendron on subnet {}",
                    checksum(&tx_signer.address()),
                    netuid
                );
            }
            let call = dendron.deregister(netuid)?.with_label("Deregister dendron");
            ctx.run_transaction(&client, &tx_signer, call).await?;
            Ok(())
        }
        DendronCommands::GetUserRole {
            netuid,
            account,
            opts,
        } => {
            let account = ctx.resolve_account(&account)?;
            let (_, dendron) = connect(ctx, &opts)?;
            let pb = spinner("Fetching dendron info...");
            let result = dendron.dendron_info(netuid, account).await;
            pb.finish_and_clear();
            if let Err(e) = &result {
                tracing::debug!(error = %e, "getDendronInfo failed");
            }
            for line in user_role_lines(&account, netuid, result.ok().as_ref()) {
                println!("{}", line);
            }
            Ok(())
        }
    }
}

fn connect(ctx: &CommandContext, opts: &DendronOpts) -> anyhow::Result<(RpcClient, DendronManager)> {
    let client = ctx.rpc_client(opts.rpc.as_deref())?;
    let dendron = ctx.contract(&client, opts.contract.as_deref(), ContractKey::Dendron)?;
    Ok((client, dendron))
}

/// Inputs of the registration pre-check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RegistrationCheck {
    pub subnet_active: bool,
    pub registration_allowed: bool,
    pub already_registered: bool,
    pub threshold: U256,
    pub base_burn_cost: U256,
    pub available_stake: U256,
}

impl RegistrationCheck {
    /// Stake threshold plus the subnet's burn cost.
    pub fn total_required(&self) -> U256 {
        self.threshold.saturating_add(self.base_burn_cost)
    }
}

/// Reasons registration would be rejected. Empty when it can proceed.
pub(crate) fn registration_blockers(check: &RegistrationCheck) -> Vec<String> {
    let mut blockers = Vec::new();
    if !check.subnet_active {
        blockers.push("subnet is not active".to_string());
    }
    if !check.registration_allowed {
        blockers.push("subnet does not allow registration".to_string());
    }
    if check.already_registered {
        blockers.push("account is already registered".to_string());
    }
    if check.available_stake < check.total_required() {
        blockers.push(format!(
            "available stake {} is below the required {} (threshold {} + burn {})",
            format_hetu_with_symbol(check.available_stake),
            format_hetu_with_symbol(check.total_required()),
            format_hetu_with_symbol(check.threshold),
            format_hetu_with_symbol(check.base_burn_cost)
        ));
    }
    blockers
}

async fn gather_check(
    ctx: &CommandContext,
    client: &RpcClient,
    dendron: &DendronManager,
    opts: &DendronOpts,
    netuid: u16,
    account: Address,
    validator: bool,
) -> anyhow::Result<RegistrationCheck> {
    let subnet: SubnetManager =
        ctx.contract(client, opts.subnet_contract.as_deref(), ContractKey::Subnet)?;
    let staking: GlobalStaking =
        ctx.contract(client, opts.staking_contract.as_deref(), ContractKey::Staking)?;

    let info = fetch("subnet info", subnet.subnet_info(netuid)).await?;
    let params = fetch("subnet params", subnet.subnet_params(netuid)).await?;
    let already_registered = fetch("dendron status", dendron.is_dendron(netuid, account)).await?;
    let available_stake = fetch("available stake", staking.available_stake(account)).await?;

    Ok(RegistrationCheck {
        subnet_active: info.is_active,
        registration_allowed: params.registration_allowed,
        already_registered,
        threshold: if validator {
            params.validator_threshold
        } else {
            params.neuron_threshold
        },
        base_burn_cost: params.base_burn_cost,
        available_stake,
    })
}

async fn can_register(
    ctx: &CommandContext,
    netuid: u16,
    account: &str,
    validator: bool,
    opts: &DendronOpts,
) -> anyhow::Result<()> {
    let account = ctx.resolve_account(account)?;
    let (client, dendron) = connect(ctx, opts)?;
    let check = gather_check(ctx, &client, &dendron, opts, netuid, account, validator).await?;

    let rows = vec![
        ("Subnet active", check.subnet_active.to_string()),
        ("Registration allowed", check.registration_allowed.to_string()),
        ("Already registered", check.already_registered.to_string()),
        ("Role", if validator { "Validator" } else { "Miner" }.to_string()),
        ("Stake threshold", format_hetu_with_symbol(check.threshold)),
        ("Base burn cost", format_hetu_with_symbol(check.base_burn_cost)),
        ("Total required", format_hetu_with_symbol(check.total_required())),
        ("Available stake", format_hetu_with_symbol(check.available_stake)),
    ];
    println!("{}", create_field_table(&rows));

    let blockers = registration_blockers(&check);
    if blockers.is_empty() {
        print_success(&format!("{} can register on subnet {}", checksum(&account), netuid));
    } else {
        for blocker in &blockers {
            print_error(blocker);
        }
        print_warning(&format!("{} cannot register on subnet {}", checksum(&account), netuid));
    }
    Ok(())
}

async fn register(
    ctx: &CommandContext,
    signer: &SignerOpts,
    opts: &DendronOpts,
    mut registration: DendronRegistration,
    stake: Option<&str>,
) -> anyhow::Result<()> {
    let (client, dendron) = connect(ctx, opts)?;
    let tx_signer = signer.signer(ctx)?;
    let account = tx_signer.address();
    let netuid = registration.netuid;

    let check = gather_check(
        ctx,
        &client,
        &dendron,
        opts,
        netuid,
        account,
        registration.is_validator,
    )
    .await?;
    registration.stake_amount = match stake {
        Some(amount) => parse_hetu(amount)?,
        None => check.threshold,
    };
    if registration.stake_amount < check.threshold {
        anyhow::bail!(
            "Stake {} is below the threshold {}",
            format_hetu_with_symbol(registration.stake_amount),
            format_hetu_with_symbol(check.threshold)
        );
    }
    let required = registration.stake_amount.saturating_add(check.base_burn_cost);
    print_info(&format!(
        "Stake {} + burn {} = {} required",
        format_hetu_with_symbol(registration.stake_amount),
        format_hetu_with_symbol(check.base_burn_cost),
        format_hetu_with_symbol(required)
    ));
    if check.available_stake < required {
        anyhow::bail!(
            "Insufficient available stake: have {}, need {}. Add stake first with `hetucli stake add-stake`",
            format_hetu_with_symbol(check.available_stake),
            format_hetu_with_symbol(required)
        );
    }
    if check.already_registered {
        anyhow::bail!("{} is already registered on subnet {}", checksum(&account), netuid);
    }

    let staking: GlobalStaking =
        ctx.contract(&client, opts.staking_contract.as_deref(), ContractKey::Staking)?;
    let token_address = fetch("HETU token", staking.hetu_token()).await?;
    let whetu: Erc20 = ctx.contract_at(&client, token_address)?;
    ensure_allowance(
        ctx,
        &client,
        &tx_signer,
        &whetu,
        staking.address(),
        registration.stake_amount,
        HETU_DECIMALS,
    )
    .await?;

    print_info(&format!(
        "Registering {} on subnet {} as {}",
        checksum(&account),
        netuid,
        if registration.is_validator { "validator" } else { "dendron" }
    ));
    let call = dendron.register(&registration)?.with_label("Register dendron");
    ctx.run_transaction(&client, &tx_signer, call).await?;
    Ok(())
}

/// Role report of an account. `None` means no registration record could be read.
pub(crate) fn user_role_lines(
    account: &Address,
    netuid: u16,
    info: Option<&DendronInfo>,
) -> Vec<String> {
    let account = checksum(account);
    match info {
        None => vec![
            format!("User {} is not registered in subnet {}", account, netuid),
            "Status: Not joined".to_string(),
        ],
        Some(info) if !info.is_active => vec![
            format!("User {} is not active in subnet {}", account, netuid),
            "Status: Not registered or inactive".to_string(),
        ],
        Some(info) => vec![
            format!("User {} in subnet {}:", account, netuid),
            format!("  Role: {}", info.role()),
            format!("  Stake: {}", format_hetu_with_symbol(info.stake)),
            format!("  Registration Block: {}", info.registration_block),
        ],
    }
}

fn print_dendron(info: &DendronInfo) {
    let rows = vec![
        ("Account", checksum(&info.account)),
        ("UID", info.uid.to_string()),
        ("Role", info.role().to_string()),
        ("Active", info.is_active.to_string()),
        ("Validator", info.is_validator.to_string()),
        ("Stake", format_hetu_with_symbol(info.stake)),
        ("Registration block", info.registration_block.to_string()),
        ("Last update", info.last_update.to_string()),
        ("Axon", format!("{}:{}", info.axon_endpoint, info.axon_port)),
        (
            "Prometheus",
            format!("{}:{}", info.prometheus_endpoint, info.prometheus_port),
        ),
    ];
    println!("{}", create_field_table(&rows));
}

fn print_accounts(kind: &str, netuid: u16, accounts: &[Address]) {
    if accounts.is_empty() {
        print_info(&format!("No {}s on subnet {}", kind.to_lowercase(), netuid));
        return;
    }
    let mut table = create_table_with_headers(&["#", kind]);
    for (i, account) in accounts.iter().enumerate() {
        table.add_row(vec![i.to_string(), checksum(account)]);
    }
    println!("{table}");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready() -> RegistrationCheck {
        RegistrationCheck {
            subnet_active: true,
            registration_allowed: true,
            already_registered: false,
            threshold: U256::exp10(18),
            base_burn_cost: U256::exp10(17),
            available_stake: U256::exp10(18) * 2,
        }
    }

    #[test]
    fn test_registration_allowed() {
        assert!(registration_blockers(&ready()).is_empty());
    }

    #[test]
    fn test_registration_blockers() {
        let check = RegistrationCheck {
            subnet_active: false,
            already_registered: true,
            available_stake: U256::zero(),
            ..ready()
        };
        let blockers = registration_blockers(&check);
        assert_eq!(blockers.len(), 3);
        assert!(blockers[2].contains("below the required 1.1 HETU"));
    }

    #[test]
    fn test_burn_cost_counts_towards_required_stake() {
        let check = RegistrationCheck {
            available_stake: U256::exp10(18),
            ..ready()
        };
        assert_eq!(check.total_required(), U256::exp10(17) * 11);
        let blockers = registration_blockers(&check);
        assert_eq!(blockers.len(), 1);
        assert!(blockers[0].contains("burn 0.1 HETU"));

        let covered = RegistrationCheck {
            available_stake: U256::exp10(17) * 11,
            ..ready()
        };
        assert!(registration_blockers(&covered).is_empty());
    }

    #[test]
    fn test_total_required_saturates() {
        let check = RegistrationCheck {
            threshold: U256::MAX,
            base_burn_cost: U256::one(),
            ..ready()
        };
        assert_eq!(check.total_required(), U256::MAX);
    }

    fn info(is_active: bool, is_validator: bool) -> DendronInfo {
        DendronInfo {
            account: Address::repeat_byte(0x11),
            uid: 3,
            is_active,
            is_validator,
            stake: U256::exp10(18) * 5,
            registration_block: 120,
            last_update: U256::from(130u64),
            axon_endpoint: String::new(),
            axon_port: 0,
            prometheus_endpoint: String::new(),
            prometheus_port: 0,
        }
    }

    #[test]
    fn test_user_role_lines() {
        let account = Address::repeat_byte(0x11);

        let missing = user_role_lines(&account, 2, None);
        assert!(missing[0].contains("is not registered in subnet 2"));
        assert_eq!(missing[1], "Status: Not joined");

        let inactive = user_role_lines(&account, 2, Some(&info(false, false)));
        assert_eq!(inactive[1], "Status: Not registered or inactive");

        let miner = user_role_lines(&account, 2, Some(&info(true, false)));
        assert_eq!(miner[1], "  Role: Miner");
        assert_eq!(miner[2], "  Stake: 5 HETU");
        assert_eq!(miner[3], "  Registration Block: 120");

        let validator = user_role_lines(&account, 2, Some(&info(true, true)));
        assert_eq!(validator[1], "  Role: Validator");
    }
}
