use serde::{Deserialize, Serialize};

use crate::amount::Amount;

/// One leg of a payment: who receives how much of which asset.
///
/// Asset transfers and multi-payments are both expressed as lists of these
/// so that a single routine validates and applies them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentData {
    pub recipient: String,
    pub asset_id: u64,
    pub amount: Amount,
}

impl PaymentData {
    pub fn new(recipient: impl Into<String>, asset_id: u64, amount: Amount) -> Self {
        Self {
            recipient: recipient.into(),
            asset_id,
            amount,
        }
    }
}
