//! Persisted record types for the governance ledger
//!
//! Every record is immutable-by-replace: updates decode the stored
//! bytes into one of these types, mutate the typed fields, and rewrite
//! the whole record. Nothing in the engine slices raw bytes.

use serde::{Deserialize, Serialize};

use crate::error::{GovernanceError, Result};

/// Account identifier as the surrounding execution environment passes
/// it in; signature checks happen before a command reaches this core.
pub type AccountId = String;

/// Lifecycle of a proposal. `Pending` transitions exactly once into one
/// of the three terminal states and never reverts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProposalStatus {
    Pending,
    Approved,
    Rejected,
    NoQuorum,
}

impl ProposalStatus {
    pub(crate) fn to_byte(self) -> u8 {
        match self {
            ProposalStatus::Pending => 0,
            ProposalStatus::Approved => 1,
            ProposalStatus::Rejected => 2,
            ProposalStatus::NoQuorum => 3,
        }
    }

    pub(crate) fn from_byte(b: u8) -> Result<Self> {
        match b {
            0 => Ok(ProposalStatus::Pending),
            1 => Ok(ProposalStatus::Approved),
            2 => Ok(ProposalStatus::Rejected),
            3 => Ok(ProposalStatus::NoQuorum),
            other => Err(GovernanceError::CorruptRecord(format!(
                "invalid proposal status byte {}",
                other
            ))),
        }
    }

    /// True once the proposal has left `Pending`.
    pub fn is_terminal(self) -> bool {
        self != ProposalStatus::Pending
    }
}

/// Vote choice
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum VoteChoice {
    Abstain,
    Yes,
    No,
}

impl VoteChoice {
    pub(crate) fn to_byte(self) -> u8 {
        match self {
            VoteChoice::Abstain => 0,
            VoteChoice::Yes => 1,
            VoteChoice::No => 2,
        }
    }

    pub(crate) fn from_byte(b: u8) -> Result<Self> {
        match b {
            0 => Ok(VoteChoice::Abstain),
            1 => Ok(VoteChoice::Yes),
            2 => Ok(VoteChoice::No),
            other => Err(GovernanceError::CorruptRecord(format!(
                "invalid vote choice byte {}",
                other
            ))),
        }
    }
}

/// A funding proposal, keyed by `proposal:{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Proposal {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub funding_requested: u64,
    pub proposer: AccountId,
    pub created_at: u64,
    pub ends_at: u64,
    pub status: ProposalStatus,
}

impl Proposal {
    /// Whether the voting window is still open at `now`. The window is
    /// inclusive of `ends_at`.
    pub fn accepts_votes_at(&self, now: u64) -> bool {
        now <= self.ends_at
    }
}

/// Running vote totals for one proposal, keyed by `tally:{id}`.
///
/// `voters` always equals the number of voter records written for the
/// proposal and `power_used` the sum of their power; both are updated
/// in the same batch as the voter record itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoteTally {
    pub yes: u64,
    pub no: u64,
    pub abstain: u64,
    pub voters: u64,
    pub power_used: u64,
}

impl VoteTally {
    /// Fold one vote into the totals with overflow-checked arithmetic.
    pub fn apply(&mut self, choice: VoteChoice, power: u64) -> Result<()> {
        let bucket = match choice {
            VoteChoice::Yes => &mut self.yes,
            VoteChoice::No => &mut self.no,
            VoteChoice::Abstain => &mut self.abstain,
        };
        *bucket = bucket
            .checked_add(power)
            .ok_or(GovernanceError::AmountOverflow)?;
        self.power_used = self
            .power_used
            .checked_add(power)
            .ok_or(GovernanceError::AmountOverflow)?;
        self.voters += 1;
        Ok(())
    }
}

/// One member's committed vote, keyed by `voter:{proposal_id}:{account}`.
/// Written at most once; the key's existence is the double-vote guard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoterRecord {
    pub choice: VoteChoice,
    pub power: u64,
    pub timestamp: u64,
}

/// Governance-token balance of a member, keyed by `member:{account}`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemberBalance {
    pub balance: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_apply_buckets() {
        let mut tally = VoteTally::default();
        tally.apply(VoteChoice::Yes, 100).unwrap();
        tally.apply(VoteChoice::No, 40).unwrap();
        tally.apply(VoteChoice::Abstain, 10).unwrap();

        assert_eq!(tally.yes, 100);
        assert_eq!(tally.no, 40);
        assert_eq!(tally.abstain, 10);
        assert_eq!(tally.voters, 3);
        assert_eq!(tally.power_used, 150);
    }

    #[test]
    fn test_tally_apply_overflow() {
        let mut tally = VoteTally {
            yes: u64::MAX - 1,
            power_used: u64::MAX - 1,
            ..VoteTally::default()
        };
        let err = tally.apply(VoteChoice::Yes, 2).unwrap_err();
        assert!(matches!(err, GovernanceError::AmountOverflow));
    }

    #[test]
    fn test_voting_window_inclusive() {
        let proposal = Proposal {
            id: 0,
            title: "t".to_string(),
            description: "d".to_string(),
            funding_requested: 1,
            proposer: "alice".to_string(),
            created_at: 0,
            ends_at: 604_800,
            status: ProposalStatus::Pending,
        };
        assert!(proposal.accepts_votes_at(604_800));
        assert!(!proposal.accepts_votes_at(604_801));
    }

    #[test]
    fn test_proposal_serializes_for_callers() {
        let proposal = Proposal {
            id: 3,
            title: "Solar".to_string(),
            description: "Panels".to_string(),
            funding_requested: 500,
            proposer: "alice".to_string(),
            created_at: 10,
            ends_at: 604_810,
            status: ProposalStatus::Pending,
        };
        let json = serde_json::to_string(&proposal).unwrap();
        assert!(json.contains("\"Pending\""));
    }
}
