// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Ledger Protocol: Transaction Core
//!
//! Everything a node needs to agree with every other node about a single
//! transaction: what it contains, how it is laid out on the wire and for
//! signing, whether it is valid against the current ledger, and how it
//! changes (and un-changes) that ledger.
//!
//! ## Architecture
//!
//! - **data**: Plain records for transactions, assets, polls and ATs.
//! - **transform**: Canonical byte codecs, including historical layouts.
//! - **transaction**: Validation, process and orphan per transaction type.
//! - **account**: Balance and last-reference view over the repository.
//! - **repository**: Storage traits and the sled-backed implementation.
//! - **crypto**: Ed25519 keys, hashes and addresses.
//! - **amount**: Fixed-point amounts with eight decimals.
//! - **config**: Wire constants and protocol activation timestamps.
//!
//! ## Ground rules
//!
//! 1. Byte layouts are consensus. A historical quirk stays a quirk.
//! 2. Rule violations are values ([`ValidationResult`]), storage failures
//!    are errors.
//! 3. Every mutation goes through an explicit repository handle, and
//!    `orphan` is the exact inverse of `process`.

pub mod account;
pub mod amount;
pub mod config;
pub mod crypto;
pub mod data;
pub mod repository;
pub mod transaction;
pub mod transform;

pub use account::{Account, PublicKeyAccount};
pub use amount::Amount;
pub use config::ChainParams;
pub use data::{Signature, TransactionData, TransactionType};
pub use repository::{LedgerDb, LedgerSession, Repository};
pub use transaction::{Transaction, TransactionError, TransactionState, ValidationResult};
pub use transform::TransformationError;
