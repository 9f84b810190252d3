//! CLI utility functions for terminal interaction and formatting.

use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use console::{style, Term};
use dialoguer::Password;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// Prompt for a password with hidden input.
pub fn prompt_password(message: &str) -> anyhow::Result<String> {
    Password::new()
        .with_prompt(message)
        .allow_empty_password(true)
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to read password: {}", e))
}

/// Prompt twice for a new password and require both entries to match.
pub fn prompt_new_password(message: &str) -> anyhow::Result<String> {
    Password::new()
        .with_prompt(message)
        .with_confirmation("Repeat password", "Passwords do not match")
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to read password: {}", e))
}

/// Password given on the command line, or prompted for.
pub fn password_or_prompt(password: Option<String>, message: &str) -> anyhow::Result<String> {
    match password {
        Some(p) => Ok(p),
        None => prompt_password(message),
    }
}

/// Create a spinner progress bar with message.
///
/// Hidden when stdout is not a terminal.
pub fn spinner(message: &str) -> ProgressBar {
    if !Term::stdout().is_term() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.blue} {msg}")
    {
        pb.set_style(spinner_style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Print success message in green.
pub fn print_success(message: &str) {
    let term = Term::stdout();
    let _ = term.write_line(&format!("{} {}", style("✓").green().bold(), message));
}

/// Print error message in red.
pub fn print_error(message: &str) {
    let term = Term::stdout();
    let _ = term.write_line(&format!("{} {}", style("✗").red().bold(), message));
}

/// Print info message in blue.
pub fn print_info(message: &str) {
    let term = Term::stdout();
    let _ = term.write_line(&format!("{} {}", style("ℹ").blue().bold(), message));
}

/// Print warning message in yellow.
pub fn print_warning(message: &str) {
    let term = Term::stdout();
    let _ = term.write_line(&format!("{} {}", style("⚠").yellow().bold(), message));
}

/// Create a styled table for CLI output.
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Create a table with custom headers.
pub fn create_table_with_headers(headers: &[&str]) -> Table {
    let mut table = create_table();
    table.set_header(headers.iter().map(|h| style(*h).bold().to_string()));
    table
}

/// Two-column field/value table.
pub fn create_field_table<K: AsRef<str>, V: AsRef<str>>(rows: &[(K, V)]) -> Table {
    let mut table = create_table_with_headers(&["Field", "Value"]);
    for (key, value) in rows {
        table.add_row(vec![key.as_ref(), value.as_ref()]);
    }
    table
}

/// Parse comma-separated list of strings, dropping empty items.
pub fn parse_str_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Read a JSON document from either an inline string or a file.
pub fn read_json_source(inline: Option<&str>, file: Option<&Path>) -> anyhow::Result<serde_json::Value> {
    let text = match (inline, file) {
        (Some(json), None) => json.to_string(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?,
        (Some(_), Some(_)) => anyhow::bail!("Provide either inline JSON or a file, not both"),
        (None, None) => anyhow::bail!("Provide inline JSON or a file"),
    };
    serde_json::from_str(&text).map_err(|e| anyhow::anyhow!("Invalid JSON: {}", e))
}
