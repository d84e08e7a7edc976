//! Governance error types
//!
//! Every variant is terminal for the command that raised it: the engine
//! never retries, and a failed command leaves all records untouched.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GovernanceError {
    #[error("account {0} is not a DAO member")]
    NotAMember(String),

    #[error("account {0} is already a DAO member")]
    AlreadyMember(String),

    #[error("insufficient tokens to propose: required {required}, held {held}")]
    InsufficientTokensToPropose { required: u64, held: u64 },

    #[error("insufficient balance: requested power {requested}, held {held}")]
    InsufficientBalance { requested: u64, held: u64 },

    #[error("proposal {0} not found")]
    ProposalNotFound(u64),

    #[error("voting closed for proposal {0}")]
    VotingClosed(u64),

    #[error("voting still open for proposal {0}")]
    VotingStillOpen(u64),

    #[error("proposal {0} is already finalized")]
    AlreadyFinalized(u64),

    #[error("account {account} already voted on proposal {proposal_id}")]
    AlreadyVoted { proposal_id: u64, account: String },

    #[error("not authorized: {0}")]
    NotAuthorized(String),

    #[error("proposal {0} is not approved")]
    ProposalNotApproved(u64),

    #[error("credits already awarded for proposal {0}")]
    CreditsAlreadyAwarded(u64),

    #[error("amount overflows the token range")]
    AmountOverflow,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("corrupt record: {0}")]
    CorruptRecord(String),

    #[error("ledger store error: {0}")]
    Store(#[from] dao_store::StoreError),

    #[error("token issuance failed: {0}")]
    Issuance(#[from] crate::external::IssuerError),

    #[error("impact registry error: {0}")]
    Impact(#[from] dao_impact::ImpactError),
}

pub type Result<T> = std::result::Result<T, GovernanceError>;
