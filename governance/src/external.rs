//! Collaborator interfaces the core calls out to
//!
//! Token creation and time both live outside the core: the engine only
//! sees these two seams. Implementations are injected at construction
//! so independent DAO instances can coexist and be tested in isolation.

use thiserror::Error;

/// The two assets the DAO deals in: the governance token that carries
/// voting power, and the reward-credit token paid out to approved
/// proposers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Governance,
    RewardCredit,
}

#[derive(Error, Debug)]
pub enum IssuerError {
    #[error("issuance rejected: {0}")]
    Rejected(String),

    #[error("issuer unavailable: {0}")]
    Unavailable(String),
}

/// External token-issuance service. The core never mints tokens itself;
/// it instructs this collaborator and fails the whole command if the
/// instruction is refused.
pub trait TokenIssuer: Send + Sync {
    fn mint_and_transfer(
        &self,
        asset: AssetKind,
        account: &str,
        amount: u64,
    ) -> Result<(), IssuerError>;

    fn balance_query(&self, asset: AssetKind, account: &str) -> Result<u64, IssuerError>;
}

/// Issuer that accepts every instruction and holds nothing. Useful when
/// the surrounding environment settles transfers out of band.
pub struct NullIssuer;

impl TokenIssuer for NullIssuer {
    fn mint_and_transfer(
        &self,
        _asset: AssetKind,
        _account: &str,
        _amount: u64,
    ) -> Result<(), IssuerError> {
        Ok(())
    }

    fn balance_query(&self, _asset: AssetKind, _account: &str) -> Result<u64, IssuerError> {
        Ok(0)
    }
}

/// Clock seam; must be monotonic for the voting-window check to hold.
pub trait TimeSource: Send + Sync {
    /// Current Unix time in seconds.
    fn now(&self) -> u64;
}

/// Wall-clock time source.
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> u64 {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}
