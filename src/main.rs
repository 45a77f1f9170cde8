use std::{path::PathBuf, sync::Arc};

use clap::{
    Parser,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};

use likedeck::{
    config::{self, Config},
    error, info, success,
    logger::ConsoleLogger,
    server::{self, AppState},
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    /// Load environment variables from this file instead of ./.env
    #[clap(long)]
    env_file: Option<PathBuf>,

    /// Address to listen on, overrides SERVER_ADDRESS
    #[clap(long)]
    address: Option<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = config::load_env(cli.env_file.as_deref()) {
        error!("Cannot load environment. Err: {}", e);
    }

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => error!("Invalid configuration: {}", e),
    };
    success!("Configuration loaded");
    if let Some(address) = cli.address {
        config.server_address = address;
    }

    let state = match AppState::from_config(&config, Arc::new(ConsoleLogger)) {
        Ok(state) => state,
        Err(e) => error!("Invalid configuration: {}", e),
    };

    info!("Starting {} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    if let Err(e) = server::start_api_server(&config.server_address, state).await {
        error!("{}", e);
    }
}
