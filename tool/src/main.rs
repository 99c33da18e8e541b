// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Ledger Tool
//!
//! Entry point for the `ledger-tool` binary. Parses CLI arguments,
//! initializes logging and runs one subcommand against the transaction core:
//!
//! - `decode`:        wire bytes to display record
//! - `signing-bytes`: the exact message a signature covers
//! - `verify`:        signature check under the configured chain params
//! - `apply`:         validate and process a batch against a database
//! - `keygen`:        fresh keypair and address
//! - `params`:        effective chain parameters

mod cli;
mod logging;

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use serde_json::Value;

use ledger_protocol::crypto::Keypair;
use ledger_protocol::transaction::{is_signature_valid, with_derived_signature};
use ledger_protocol::{transform, ChainParams, LedgerDb, Transaction, TransactionData};

use cli::{ApplyArgs, Commands, LedgerToolCli};

fn main() -> Result<()> {
    let cli = LedgerToolCli::parse();
    logging::init_logging(&cli.global.log_level, cli.global.log_format);

    let params = load_params(cli.global.params.as_deref())?;

    match cli.command {
        Commands::Decode(args) => {
            let data = decode_hex_transaction(&args.hex, &params)?;
            println!("{}", serde_json::to_string_pretty(&describe(&data, &params)?)?);
        }
        Commands::SigningBytes(args) => {
            let data = decode_hex_transaction(&args.hex, &params)?;
            println!("{}", hex::encode(transform::bytes_for_signing(&data, &params)?));
        }
        Commands::Verify(args) => {
            let data = decode_hex_transaction(&args.hex, &params)?;
            if !is_signature_valid(&data, &params)? {
                bail!("signature does not verify");
            }
            println!("signature valid");
        }
        Commands::Apply(args) => {
            let applied = apply_file(&args, &params)?;
            println!("applied {applied} transaction(s)");
        }
        Commands::Keygen => {
            let keypair = Keypair::generate();
            println!("public key: {}", keypair.public_key_hex());
            println!("address:    {}", keypair.address());
        }
        Commands::Params => {
            println!("{}", serde_json::to_string_pretty(&params)?);
        }
    }
    Ok(())
}

fn load_params(path: Option<&Path>) -> Result<ChainParams> {
    match path {
        Some(path) => {
            let params = ChainParams::load(path)
                .with_context(|| format!("failed to load chain params from {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded chain params");
            Ok(params)
        }
        None => Ok(ChainParams::default()),
    }
}

/// Parse hex (an optional `0x` prefix and surrounding whitespace allowed)
/// and decode the transaction it carries.
fn decode_hex_transaction(input: &str, params: &ChainParams) -> Result<TransactionData> {
    let trimmed = input.trim();
    let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let bytes = hex::decode(digits).context("transaction is not valid hex")?;
    let data = transform::decode(&bytes, params).context("failed to decode transaction")?;
    Ok(data)
}

/// Display record extended with the type name, a readable timestamp and the
/// signature check.
fn describe(data: &TransactionData, params: &ChainParams) -> Result<Value> {
    let mut record = transform::to_display_record(data);
    let utc = DateTime::<Utc>::from_timestamp_millis(data.timestamp()).map(|t| t.to_rfc3339());
    let signature_valid = is_signature_valid(data, params)?;

    if let Value::Object(fields) = &mut record {
        fields.insert("typeName".into(), Value::from(data.transaction_type().to_string()));
        fields.insert("timestampUtc".into(), utc.map_or(Value::Null, Value::from));
        fields.insert("signatureValid".into(), Value::from(signature_valid));
    }
    Ok(record)
}

/// Apply every transaction in `args.file`, in order, inside one storage
/// session. Nothing is committed unless every signature verifies and every
/// transaction validates and processes.
fn apply_file(args: &ApplyArgs, params: &ChainParams) -> Result<usize> {
    let contents = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let db = LedgerDb::open(&args.db)
        .with_context(|| format!("failed to open ledger database at {}", args.db.display()))?;
    let mut session = db.session();
    let mut applied = 0;

    for (index, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line_no = index + 1;

        let mut data = decode_hex_transaction(line, params).with_context(|| format!("line {line_no}"))?;
        if matches!(data, TransactionData::At(_)) && !data.is_signed() {
            data = with_derived_signature(&data, params)?;
        }

        if !is_signature_valid(&data, params)? {
            session.rollback();
            bail!("line {line_no}: {} signature does not verify", data.transaction_type());
        }

        let mut transaction = Transaction::new(data);
        let verdict = transaction.is_valid(&session, params)?;
        if !verdict.is_ok() {
            session.rollback();
            bail!("line {line_no}: {} transaction rejected: {verdict}", transaction.transaction_type());
        }
        transaction
            .process(&mut session, params)
            .with_context(|| format!("line {line_no}: processing failed"))?;
        applied += 1;
    }

    if args.dry_run {
        tracing::info!(applied, writes = session.pending_writes(), "dry run, rolling back");
        session.rollback();
    } else {
        session.commit().context("failed to commit ledger session")?;
        tracing::info!(applied, path = %args.db.display(), "committed");
    }
    Ok(applied)
}
