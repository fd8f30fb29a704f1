//! setup-warp - Cloudflare WARP for CI runners

use clap::Parser;
use setup_warp::cli::Cli;
use setup_warp::output::workflow;

#[tokio::main]
async fn main() {
    setup_warp::logging::init();
    let cli = Cli::parse();
    if let Err(e) = cli.run().await {
        if std::env::var("GITHUB_ACTIONS").is_ok_and(|v| v == "true") {
            workflow::error(&format!("{e:#}"));
        }
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
