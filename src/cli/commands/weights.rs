//! Weight commands for validators.

use super::{fetch, ContractOpts, SignerOpts};
use crate::cli::context::CommandContext;
use crate::cli::utils::{
    create_table_with_headers, parse_str_list, print_info, print_success,
    print_warning, read_json_source,
};
use crate::config::ContractKey;
use crate::contracts::weights::{parse_weights_json, weights_from_scores};
use crate::contracts::{WeightEntry, Weights};
use crate::core::constants::{WEIGHTS_TEMPLATE_FILE, WEIGHT_SCALE};
use crate::utils::address::checksum;
use clap::{Args, Subcommand};
use ethers_core::types::U256;
use std::path::{Path, PathBuf};

#[derive(Args, Clone)]
pub struct WeightsCommand {
    #[command(subcommand)]
    pub command: WeightsCommands,
}

#[derive(Subcommand, Clone)]
pub enum WeightsCommands {
    /// Submit weights from a JSON file or string
    SetWeights {
        #[command(flatten)]
        signer: SignerOpts,
        #[arg(long)]
        netuid: u16,
        /// JSON file with `[{"dest": ..., "weight": ...}]`
        #[arg(long, conflicts_with = "weights_json")]
        weights_file: Option<PathBuf>,
        /// Inline JSON weights
        #[arg(long)]
        weights_json: Option<String>,
        #[command(flatten)]
        opts: ContractOpts,
    },

    /// Weight a validator assigned to a destination
    GetWeights {
        #[arg(long)]
        netuid: u16,
        /// Validator keystore name or address
        #[arg(long)]
        validator: String,
        /// Destination keystore name or address
        #[arg(long)]
        dest: String,
        #[command(flatten)]
        opts: ContractOpts,
    },

    /// Write an example weights file
    CreateWeightsTemplate {
        #[arg(long, default_value = WEIGHTS_TEMPLATE_FILE)]
        output_file: PathBuf,
    },

    /// Submit weights from comma separated targets and scores
    QuickScore {
        #[command(flatten)]
        signer: SignerOpts,
        #[arg(long)]
        netuid: u16,
        /// Destination addresses, comma separated
        #[arg(long)]
        targets: String,
        /// Scores from 0 to 1000000 (0 to 1), comma separated
        #[arg(long)]
        scores: String,
        #[command(flatten)]
        opts: ContractOpts,
    },
}

pub async fn execute(cmd: WeightsCommand, ctx: &CommandContext) -> anyhow::Result<()> {
    match cmd.command {
        WeightsCommands::SetWeights {
            signer,
            netuid,
            weights_file,
            weights_json,
            opts,
        } => {
            let value = read_json_source(weights_json.as_deref(), weights_file.as_deref())?;
            let entries = parse_weights_json(&value.to_string())?;
            submit(ctx, &signer, &opts, netuid, &entries).await
        }
        WeightsCommands::GetWeights {
            netuid,
            validator,
            dest,
            opts,
        } => {
            let validator = ctx.resolve_account(&validator)?;
            let dest = ctx.resolve_account(&dest)?;
            let client = ctx.rpc_client(opts.rpc.as_deref())?;
            let weights: Weights =
                ctx.contract(&client, opts.contract.as_deref(), ContractKey::Weights)?;
            let raw = fetch("weight", weights.weight(netuid, validator, dest)).await?;
            println!(
                "Weight for subnet {}, validator {}, destination {}:",
                netuid,
                checksum(&validator),
                checksum(&dest)
            );
            println!("  Raw weight: {}", raw);
            println!("  Normalized weight: {:.6} (0-1 scale)", normalized(raw));
            Ok(())
        }
        WeightsCommands::CreateWeightsTemplate { output_file } => {
            write_template(&output_file)?;
            print_success(&format!("Weights template created: {}", output_file.display()));
            print_info(&format!(
                "Weights range from 0 to {} (0 to 1); 500000 is 0.5",
                WEIGHT_SCALE
            ));
            print_info("Edit the file with your destination addresses and weights");
            Ok(())
        }
        WeightsCommands::QuickScore {
            signer,
            netuid,
            targets,
            scores,
            opts,
        } => {
            let targets = parse_str_list(&targets);
            let scores = parse_str_list(&scores);
            let entries = weights_from_scores(&targets, &scores)?;
            submit(ctx, &signer, &opts, netuid, &entries).await
        }
    }
}

async fn submit(
    ctx: &CommandContext,
    signer: &SignerOpts,
    opts: &ContractOpts,
    netuid: u16,
    entries: &[WeightEntry],
) -> anyhow::Result<()> {
    if entries.is_empty() {
        anyhow::bail!("No weights to set");
    }
    let client = ctx.rpc_client(opts.rpc.as_deref())?;
    let weights: Weights = ctx.contract(&client, opts.contract.as_deref(), ContractKey::Weights)?;
    // Validates every entry before anything is signed.
    let call = weights.set_weights(netuid, entries)?.with_label("SetWeights");
    let tx_signer = signer.signer(ctx)?;

    print_info(&format!(
        "Setting {} weights for subnet {}",
        entries.len(),
        netuid
    ));
    let mut table = create_table_with_headers(&["#", "Destination", "Weight", "Normalized"]);
    for (i, entry) in entries.iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            entry.dest.clone(),
            entry.weight.to_string(),
            format!("{:.6}", entry.weight as f64 / WEIGHT_SCALE as f64),
        ]);
    }
    println!("{table}");

    ctx.run_transaction(&client, &tx_signer, call).await?;
    print_success(&format!("Weights updated for subnet {}", netuid));
    Ok(())
}

fn normalized(raw: U256) -> f64 {
    if raw > U256::from(u64::MAX) {
        print_warning("Weight exceeds the 64-bit range");
        return f64::INFINITY;
    }
    raw.as_u64() as f64 / WEIGHT_SCALE as f64
}

/// Example entries written by `create-weights-template`.
pub(crate) fn template_entries() -> Vec<WeightEntry> {
    vec![
        WeightEntry {
            dest: "0x1234567890123456789012345678901234567890".to_string(),
            weight: 500_000,
        },
        WeightEntry {
            dest: "0x0987654321098765432109876543210987654321".to_string(),
            weight: 750_000,
        },
    ]
}

fn write_template(path: &Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&template_entries())?;
    std::fs::write(path, json)
        .map_err(|e| anyhow::anyhow!("Failed to create template {}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_template_parses_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(WEIGHTS_TEMPLATE_FILE);
        write_template(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let entries = parse_weights_json(&text).unwrap();
        assert_eq!(entries, template_entries());
    }

    #[test]
    fn test_normalized() {
        assert_eq!(normalized(U256::from(250_000u64)), 0.25);
        assert_eq!(normalized(U256::from(WEIGHT_SCALE)), 1.0);
    }
}
