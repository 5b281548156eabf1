use std::path::PathBuf;

use clap::{Parser, Subcommand};
use hd_key_deriv::{Algorithm, DerivativeFormat, SecretType};

#[derive(Parser)]
#[command(
    name = "hd-dev-cli",
    about = "Derive, encode and decode HD keys for development",
    version
)]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        env = "HD_ENGINE_CONFIG",
        help = "the path to the engine config file"
    )]
    pub(crate) config: Option<PathBuf>,

    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum Commands {
    Derive(DeriveArgs),

    Decode(DecodeArgs),
}

#[derive(Parser, Debug, Clone)]
#[command(about = "Derive a key node from a mnemonic", version)]
pub(crate) struct DeriveArgs {
    #[arg(
        long,
        value_parser = clap::value_parser!(Algorithm),
        help = "one of secp256k1, ed25519, sr25519, sapling"
    )]
    pub(crate) algorithm: Algorithm,

    #[arg(long, env = "HD_MNEMONIC", help = "the BIP-39 mnemonic")]
    pub(crate) mnemonic: String,

    #[arg(long, env = "HD_PASSWORD", help = "the optional mnemonic password")]
    pub(crate) password: Option<String>,

    #[arg(long, help = "the derivation path, e.g. m/44'/0'/0'/0/0")]
    pub(crate) path: Option<String>,

    #[arg(
        long,
        value_parser = clap::value_parser!(DerivativeFormat),
        help = "encode the node as bip32, hex, bytes or zip32 instead of printing it"
    )]
    pub(crate) format: Option<DerivativeFormat>,

    #[arg(long, help = "the master HMAC key (secp256k1 and ed25519 only)")]
    pub(crate) key: Option<String>,

    #[arg(
        long,
        value_parser = clap::value_parser!(SecretType),
        help = "seed post-processing: secret or miniSecretXor"
    )]
    pub(crate) secret_type: Option<SecretType>,
}

#[derive(Parser, Debug, Clone)]
#[command(about = "Decode an encoded node back into a derivative", version)]
pub(crate) struct DecodeArgs {
    #[arg(
        long,
        help = "the encoded node as JSON, e.g. {\"type\":\"bip32\",\"secretKey\":...,\"publicKey\":...}"
    )]
    pub(crate) input: String,
}
