//! Derives a node from a mnemonic and prints it as JSON.

use anyhow::{bail, Result};
use hd_key_deriv::{
    Algorithm, CryptoConfiguration, KeyEngine, Sr25519Compatibility, ED25519_DEFAULT_KEY,
    SECP256K1_DEFAULT_KEY,
};
use tracing::info;

use crate::cli::DeriveArgs;

/// Builds the configuration for `args`, applying the optional overrides.
fn crypto_configuration(args: &DeriveArgs) -> Result<CryptoConfiguration> {
    let secret_type = args.secret_type.unwrap_or_default();
    let key = |default: &str| args.key.clone().unwrap_or_else(|| default.to_owned());

    let config = match args.algorithm {
        Algorithm::Secp256k1 => CryptoConfiguration::Secp256k1 {
            key: key(SECP256K1_DEFAULT_KEY),
            secret_type,
        },
        Algorithm::Ed25519 => CryptoConfiguration::Ed25519 {
            key: key(ED25519_DEFAULT_KEY),
            secret_type,
        },
        Algorithm::Sr25519 => {
            if args.key.is_some() || args.secret_type.is_some() {
                bail!("--key and --secret-type do not apply to sr25519");
            }
            CryptoConfiguration::Sr25519 {
                compatibility: Sr25519Compatibility::Substrate,
            }
        }
        Algorithm::Sapling => {
            if args.key.is_some() {
                bail!("--key does not apply to sapling");
            }
            CryptoConfiguration::Sapling { secret_type }
        }
    };

    Ok(config)
}

/// Handles the derive command.
pub(crate) async fn handle_derive(engine: &KeyEngine, args: DeriveArgs) -> Result<()> {
    let config = crypto_configuration(&args)?;

    if config.algorithm() == Algorithm::Sr25519 {
        engine.ensure_ready().await?;
    }

    let seed = engine.seed_from_mnemonic(&config, &args.mnemonic, args.password.as_deref())?;
    let derivative = engine.derive(&config, &seed, args.path.as_deref())?;
    info!(
        algorithm = %config.algorithm(),
        depth = derivative.depth,
        "derived node"
    );

    let output = match args.format {
        Some(format) => {
            serde_json::to_string_pretty(&engine.encode_derivative(format, &derivative)?)?
        }
        None => serde_json::to_string_pretty(&derivative)?,
    };
    println!("{output}");

    Ok(())
}
