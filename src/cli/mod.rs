pub mod keys;
pub mod ops;
pub mod tx;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::common::{Address, Coordinate};

#[derive(Parser)]
#[command(name = "compass-ledger")]
#[command(about = "Compass ledger transaction engine", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "compass.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate an ed25519 key and print its account identity
    Keygen,
    /// Build and sign a transaction
    Tx {
        #[command(subcommand)]
        cmd: tx::TxCommands,
    },
    /// Decode a hex-encoded transaction and print its fields
    Inspect {
        hex: String,
    },
    /// Validate and execute a JSON block against the local state
    Apply {
        #[arg(long)]
        block: PathBuf,
    },
    /// Show an account's balance at a coordinate
    Balance {
        #[arg(long)]
        address: Address,
        #[arg(long, default_value = "0:0")]
        coord: Coordinate,
    },
}
