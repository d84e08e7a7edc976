//! Membership ledger
//!
//! Tracks each account's governance-token balance and the member
//! counter. The governance engine checks spending power here but never
//! debits it; balances only grow, through grants and top-ups.

use serde::{Deserialize, Serialize};

use dao_store::LedgerStore;

use crate::codec;
use crate::error::{GovernanceError, Result};
use crate::external::{AssetKind, TokenIssuer};
use crate::keys;
use crate::records::MemberBalance;

/// What `grant_initial` does when the account already holds a balance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RejoinPolicy {
    /// Rejoining fails with `AlreadyMember`; `top_up` is the explicit
    /// path for adding tokens.
    Reject,
    /// Rejoining credits a flat bonus without bumping the member count.
    FlatBonus(u64),
}

#[derive(Clone)]
pub struct MembershipLedger {
    store: LedgerStore,
    initial_grant: u64,
    rejoin_policy: RejoinPolicy,
}

impl MembershipLedger {
    pub fn new(store: LedgerStore, initial_grant: u64, rejoin_policy: RejoinPolicy) -> Self {
        MembershipLedger {
            store,
            initial_grant,
            rejoin_policy,
        }
    }

    /// Grant a new member their initial balance, instructing the token
    /// issuer to mirror the grant on the governance asset. For existing
    /// members the configured [`RejoinPolicy`] decides.
    pub fn grant_initial(&mut self, account: &str, issuer: &dyn TokenIssuer) -> Result<u64> {
        match self.read_balance(account)? {
            None => {
                issuer.mint_and_transfer(AssetKind::Governance, account, self.initial_grant)?;
                let count = self.member_count()?;
                self.store.put_many(vec![
                    (
                        keys::member(account),
                        codec::encode_member_balance(&MemberBalance {
                            balance: self.initial_grant,
                        }),
                    ),
                    (keys::MEMBER_COUNT.to_vec(), codec::encode_counter(count + 1)),
                ])?;
                log::info!("member {} joined with balance {}", account, self.initial_grant);
                Ok(self.initial_grant)
            }
            Some(existing) => match self.rejoin_policy {
                RejoinPolicy::Reject => Err(GovernanceError::AlreadyMember(account.to_string())),
                RejoinPolicy::FlatBonus(bonus) => {
                    let balance = existing
                        .balance
                        .checked_add(bonus)
                        .ok_or(GovernanceError::AmountOverflow)?;
                    issuer.mint_and_transfer(AssetKind::Governance, account, bonus)?;
                    self.write_balance(account, balance)?;
                    Ok(balance)
                }
            },
        }
    }

    /// Add `amount` to an existing member's balance.
    pub fn top_up(&mut self, account: &str, amount: u64) -> Result<u64> {
        let existing = self
            .read_balance(account)?
            .ok_or_else(|| GovernanceError::NotAMember(account.to_string()))?;
        let balance = existing
            .balance
            .checked_add(amount)
            .ok_or(GovernanceError::AmountOverflow)?;
        self.write_balance(account, balance)?;
        Ok(balance)
    }

    /// Spending-power query: absent accounts read as zero. Use
    /// [`MembershipLedger::is_member`] to distinguish "no record" from
    /// "zero balance".
    pub fn balance_of(&self, account: &str) -> Result<u64> {
        Ok(self.read_balance(account)?.map(|m| m.balance).unwrap_or(0))
    }

    pub fn is_member(&self, account: &str) -> Result<bool> {
        Ok(self.store.exists(&keys::member(account))?)
    }

    pub fn member_count(&self) -> Result<u64> {
        match self.store.get(keys::MEMBER_COUNT)? {
            Some(bytes) => codec::decode_counter(&bytes),
            None => Ok(0),
        }
    }

    fn read_balance(&self, account: &str) -> Result<Option<MemberBalance>> {
        match self.store.get(&keys::member(account))? {
            Some(bytes) => Ok(Some(codec::decode_member_balance(&bytes)?)),
            None => Ok(None),
        }
    }

    fn write_balance(&self, account: &str, balance: u64) -> Result<()> {
        self.store.put(
            &keys::member(account),
            codec::encode_member_balance(&MemberBalance { balance }),
        )?;
        Ok(())
    }
}
