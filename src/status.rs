//! Deposit status values reported by the deposit server.

use crate::errors::DepositError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a deposit, as found in `swhdeposit:deposit_status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepositStatus {
    Partial,
    Deposited,
    Rejected,
    Verified,
    Loading,
    Done,
    Failed,
}

impl DepositStatus {
    pub const ALL: [DepositStatus; 7] = [
        DepositStatus::Partial,
        DepositStatus::Deposited,
        DepositStatus::Rejected,
        DepositStatus::Verified,
        DepositStatus::Loading,
        DepositStatus::Done,
        DepositStatus::Failed,
    ];

    /// Get the wire string (e.g., "done")
    pub fn as_str(&self) -> &'static str {
        match self {
            DepositStatus::Partial => "partial",
            DepositStatus::Deposited => "deposited",
            DepositStatus::Rejected => "rejected",
            DepositStatus::Verified => "verified",
            DepositStatus::Loading => "loading",
            DepositStatus::Done => "done",
            DepositStatus::Failed => "failed",
        }
    }

    /// Human-readable meaning of the status.
    pub fn description(&self) -> &'static str {
        match self {
            DepositStatus::Partial => "multipart deposit is still ongoing",
            DepositStatus::Deposited => "deposit completed, ready for checks",
            DepositStatus::Rejected => "deposit failed the checks",
            DepositStatus::Verified => "content and metadata verified, ready for loading",
            DepositStatus::Loading => "loading in-progress",
            DepositStatus::Done => "loading completed successfully",
            DepositStatus::Failed => "the deposit loading has failed",
        }
    }

    /// Whether the server will no longer move the deposit to another state.
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            DepositStatus::Rejected | DepositStatus::Done | DepositStatus::Failed
        )
    }
}

impl FromStr for DepositStatus {
    type Err = DepositError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DepositStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DepositError::InvalidInput(format!("unknown deposit status: {}", s)))
    }
}

impl fmt::Display for DepositStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
