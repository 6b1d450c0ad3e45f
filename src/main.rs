//! CDP Wallet Demo CLI
//!
//! Runs the demonstration sequence end to end. Configuration comes from the
//! config file and environment (see `config`); there are no run-time flags.

use cdp_wallet_demo::config::{load_config, ConfigOverrides};
use cdp_wallet_demo::demo::DemoRunner;
use cdp_wallet_demo::platform::{ApiKey, HttpPlatform};
use clap::Parser;
use std::path::Path;
use std::process;

#[derive(Parser, Debug)]
#[command(
    name = "cdp-wallet-demo",
    version,
    about = "Create or import a custodial wallet and walk it through transfers, signing, token deployment and contract reads",
    long_about = None
)]
struct Cli {}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(None, ConfigOverrides::new())?;
    log::info!(
        "Network: {}, credential file: {}",
        config.network,
        config.credential_path
    );

    let api_key = ApiKey::from_json_file(Path::new(&config.platform.api_key_path))?;
    let platform = HttpPlatform::configure(&config.platform, api_key)?;

    DemoRunner::new(&platform, &config).run()?;
    Ok(())
}

fn main() {
    let _cli = Cli::parse();

    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
