//! # CLI Interface
//!
//! Command-line structure for `ledger-tool`, using `clap` derive.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::logging::LogFormat;

/// Inspect, verify and apply ledger transactions.
#[derive(Parser, Debug)]
#[command(
    name = "ledger-tool",
    about = "Inspect, verify and apply ledger transactions",
    version,
    propagate_version = true
)]
pub struct LedgerToolCli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every subcommand.
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// JSON file with protocol activation timestamps.
    ///
    /// When omitted, the main chain's history is used.
    #[arg(long, short = 'p', global = true, env = "LEDGER_PARAMS")]
    pub params: Option<PathBuf>,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Default log filter when `RUST_LOG` is not set.
    #[arg(long, global = true, default_value = "ledger_tool=info,ledger_protocol=warn")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decode a hex-encoded transaction and print its display record.
    Decode(TransactionArgs),
    /// Print the bytes a transaction's signature covers, hex-encoded.
    SigningBytes(TransactionArgs),
    /// Check a transaction's signature. Exits non-zero if it does not verify.
    Verify(TransactionArgs),
    /// Validate and process a file of transactions against a ledger
    /// database, committing only if every transaction applies.
    Apply(ApplyArgs),
    /// Generate a fresh keypair and print its public key and address.
    Keygen,
    /// Print the effective chain parameters as JSON.
    Params,
}

#[derive(Args, Debug)]
pub struct TransactionArgs {
    /// Transaction bytes as hex.
    pub hex: String,
}

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Ledger database directory. Created if missing.
    #[arg(long, short = 'd', env = "LEDGER_DB")]
    pub db: PathBuf,

    /// File with one hex-encoded transaction per line, in block order.
    /// Blank lines and lines starting with `#` are skipped.
    pub file: PathBuf,

    /// Validate and process, then roll back instead of committing.
    #[arg(long)]
    pub dry_run: bool,
}
