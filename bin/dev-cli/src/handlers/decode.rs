//! Decodes an encoded node and prints the derivative as JSON.

use anyhow::{Context, Result};
use hd_key_deriv::{EncodedDerivative, KeyEngine};
use tracing::info;

use crate::cli::DecodeArgs;

/// Handles the decode command.
pub(crate) fn handle_decode(engine: &KeyEngine, args: DecodeArgs) -> Result<()> {
    let encoded: EncodedDerivative =
        serde_json::from_str(&args.input).context("input is not an encoded node")?;

    let derivative = engine.decode_derivative(&encoded)?;
    info!(
        format = encoded.type_tag(),
        depth = derivative.depth,
        "decoded node"
    );

    println!("{}", serde_json::to_string_pretty(&derivative)?);
    Ok(())
}
