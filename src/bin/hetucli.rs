//! hetucli binary entrypoint.

use hetu_cli::cli;
use hetu_cli::cli::utils::print_error;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}
