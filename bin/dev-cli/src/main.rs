//! Developer CLI for the HD key engine.

mod cli;
mod handlers;
mod params;

use anyhow::{Error, Result};
use clap::Parser;
use hd_key_deriv::KeyEngine;
use hd_wallet_common::logging::{self, LoggerConfig};

use crate::handlers::{decode, derive_keys};

#[tokio::main]
async fn main() -> Result<(), Error> {
    logging::init(LoggerConfig::with_base_name("hd-dev-cli"));

    let cli = cli::Cli::parse();
    let engine = KeyEngine::new(params::load_engine_config(cli.config.as_deref())?);

    match cli.command {
        cli::Commands::Derive(args) => derive_keys::handle_derive(&engine, args).await,
        cli::Commands::Decode(args) => decode::handle_decode(&engine, args),
    }
}
