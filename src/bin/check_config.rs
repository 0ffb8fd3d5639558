//! Print the effective configuration and credential status.

use clap::Parser;

use nova_video::Config;

/// Show current settings and whether credentials are configured.
#[derive(Parser, Debug)]
#[command(name = "check_config", version, about)]
struct Args {}

fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    Args::parse();

    println!("=== video generation configuration ===");
    let config = Config::from_env();
    config.log_summary();

    let (ok, missing) = config.validate_credentials();
    if ok {
        println!("credentials are configured.");
    } else {
        println!(
            "credentials are not configured (missing: {}).",
            missing.join(", ")
        );
        println!("edit your .env file or export the variables directly.");
    }
}
