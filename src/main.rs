use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rocket::routes;

mod config;
use config::RelayConfig;

mod relay;
use relay::Relay;

mod webhooks;
use webhooks::{github::GitHubSecret, github_webhook};

#[derive(Parser)]
#[command(version)]
struct Opts {
    /// Configuration file for hiprelay
    #[arg(short, long)]
    config: PathBuf,
}

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let opts = Opts::parse();
    let config_file = File::open(&opts.config)
        .with_context(|| format!("couldn't open {}:", opts.config.display()))?;
    let config: RelayConfig = serde_yaml::from_reader(BufReader::new(config_file))
        .context("couldn't parse config file")?;

    let github_secret = config.github_secret.clone();
    let relay = Relay::new(&config).context("failed to create relay")?;

    let rocket = rocket::build()
        .mount("/", routes![github_webhook])
        .manage(relay)
        .manage(GitHubSecret(github_secret));
    rocket.launch().await.map_err(|err| anyhow::anyhow!(err))?;

    Ok(())
}
