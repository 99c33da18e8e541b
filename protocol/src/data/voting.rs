//! Poll and vote records.

use serde::{Deserialize, Serialize};

use super::PublicKey;

/// A single named choice in a poll.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PollOptionData {
    pub option_name: String,
}

impl PollOptionData {
    pub fn new(option_name: impl Into<String>) -> Self {
        Self {
            option_name: option_name.into(),
        }
    }
}

/// A published poll. Poll names are unique and lower case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollData {
    pub creator_public_key: PublicKey,
    pub owner: String,
    pub poll_name: String,
    pub description: String,
    pub poll_options: Vec<PollOptionData>,
    /// Timestamp of the create-poll transaction that published it.
    pub published: i64,
}

/// The current vote of one voter in one poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteOnPollData {
    pub poll_name: String,
    pub voter_public_key: PublicKey,
    pub option_index: i32,
}
