use serde::{Deserialize, Serialize};

use super::Signature;

/// Metadata of an issued asset.
///
/// `reference` is the signature of the issue-asset transaction that created
/// it. The native asset is created at genesis under
/// [`NATIVE_ASSET_ID`](crate::config::NATIVE_ASSET_ID).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetData {
    pub asset_id: u64,
    pub owner: String,
    pub name: String,
    pub description: String,
    pub quantity: i64,
    pub is_divisible: bool,
    pub reference: Signature,
}
