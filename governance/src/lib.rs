//! Climate DAO Governance Core
//!
//! Implements the proposal/vote state machine over a key-value ledger:
//! members submit funding proposals, cast token-weighted votes inside a
//! bounded window, and anyone can deterministically finalize the
//! outcome once voting closes. Token issuance and the clock are
//! injected collaborator interfaces; see [`external`].

pub mod codec;
pub mod engine;
pub mod error;
pub mod external;
pub mod keys;
pub mod membership;
pub mod records;

use serde::{Deserialize, Serialize};

pub use engine::GovernanceEngine;
pub use error::{GovernanceError, Result};
pub use external::{AssetKind, IssuerError, NullIssuer, SystemClock, TimeSource, TokenIssuer};
pub use membership::{MembershipLedger, RejoinPolicy};
pub use records::{
    AccountId, MemberBalance, Proposal, ProposalStatus, VoteChoice, VoteTally, VoterRecord,
};

/// Default governance parameters.
pub mod config {
    /// Voting window per proposal (7 days).
    pub const DEFAULT_VOTING_PERIOD_SECS: u64 = 604_800;

    /// Participation quorum (51% of total supply).
    pub const DEFAULT_QUORUM_PCT: u64 = 51;

    /// Minimum governance-token balance to submit a proposal.
    pub const DEFAULT_MIN_TOKENS_TO_PROPOSE: u64 = 1_000;

    /// Governance tokens granted to each new member.
    pub const DEFAULT_INITIAL_MEMBER_GRANT: u64 = 1_000;

    /// Total governance-token supply used for quorum arithmetic.
    pub const DEFAULT_TOTAL_TOKEN_SUPPLY: u64 = 1_000_000;
}

/// Process-wide DAO parameters, fixed at engine construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaoConfig {
    pub admin: AccountId,
    pub voting_period_secs: u64,
    pub min_tokens_to_propose: u64,
    pub total_token_supply: u64,
    /// 0-100; quorum is `total_token_supply * quorum_pct / 100`,
    /// truncating.
    pub quorum_pct: u64,
    pub initial_member_grant: u64,
    pub rejoin_policy: RejoinPolicy,
    /// When set, only the admin may finalize proposals.
    pub admin_finalize_only: bool,
}

impl DaoConfig {
    /// Configuration with the default parameters and `admin` as the
    /// administrator.
    pub fn new(admin: impl Into<AccountId>) -> Self {
        DaoConfig {
            admin: admin.into(),
            voting_period_secs: config::DEFAULT_VOTING_PERIOD_SECS,
            min_tokens_to_propose: config::DEFAULT_MIN_TOKENS_TO_PROPOSE,
            total_token_supply: config::DEFAULT_TOTAL_TOKEN_SUPPLY,
            quorum_pct: config::DEFAULT_QUORUM_PCT,
            initial_member_grant: config::DEFAULT_INITIAL_MEMBER_GRANT,
            rejoin_policy: RejoinPolicy::Reject,
            admin_finalize_only: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_parameters() {
        let cfg = DaoConfig::new("admin");
        assert_eq!(cfg.voting_period_secs, 604_800);
        assert_eq!(cfg.quorum_pct, 51);
        assert_eq!(cfg.min_tokens_to_propose, 1_000);
        assert_eq!(cfg.rejoin_policy, RejoinPolicy::Reject);
    }

    #[test]
    fn test_config_json_roundtrip() {
        let cfg = DaoConfig::new("admin");
        let json = serde_json::to_string(&cfg).unwrap();
        let back: DaoConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.admin, "admin");
        assert_eq!(back.total_token_supply, cfg.total_token_supply);
    }
}
