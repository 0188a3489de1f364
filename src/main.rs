use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::sync::mpsc::unbounded_channel;
use tracing::{info, warn};

mod bot;
use bot::Relay;

mod config;
use config::RelayConfig;

mod sink;
use sink::ChannelSink;

mod webhooks;
use webhooks::{github::GitHubSecret, WebhookService};

#[derive(Parser)]
#[clap(version = "0.1")]
struct Opts {
    /// Configuration file for hookrelay
    #[clap(short, long, parse(from_os_str))]
    config: PathBuf,
}

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let opts = Opts::parse();
    let config = RelayConfig::from_path(&opts.config)?;

    let secret = GitHubSecret(config.secret.clone());
    if !secret.is_enabled() {
        warn!("no secret configured, webhook signatures won't be verified");
    }

    let (sender, receiver) = unbounded_channel();
    let service = WebhookService::new(
        secret,
        config.events.clone(),
        config.matrix_room_id.clone(),
        config.author.clone(),
        Box::new(ChannelSink(sender)),
    );

    let figment = rocket::Config::figment()
        .merge(("address", config.address))
        .merge(("port", config.port));

    let relay = Relay::new(config).context("failed to create matrix bot")?;
    relay.init().await.context("failed to init matrix bot")?;
    tokio::spawn(async move { relay.run(receiver).await });

    info!("listening for GitHub webhooks");
    let rocket = webhooks::mount(rocket::custom(figment), service);
    rocket
        .launch()
        .await
        .map(drop)
        .map_err(|err| anyhow::anyhow!("webhook listener failed: {}", err))
}
