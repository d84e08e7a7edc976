//! Governance engine: the proposal/vote state machine
//!
//! A sequential command processor. Every command validates all of its
//! preconditions against the membership ledger and the record store
//! first, and only then writes; multi-record effects go through one
//! atomic store batch. A failed command therefore leaves every record
//! byte-identical to its pre-call state.

use dao_impact::ImpactRegistry;
use dao_store::LedgerStore;

use crate::codec;
use crate::error::{GovernanceError, Result};
use crate::external::{AssetKind, TimeSource, TokenIssuer};
use crate::keys;
use crate::membership::MembershipLedger;
use crate::records::{Proposal, ProposalStatus, VoteChoice, VoteTally, VoterRecord};
use crate::DaoConfig;

pub struct GovernanceEngine {
    store: LedgerStore,
    members: MembershipLedger,
    impact: ImpactRegistry,
    config: DaoConfig,
    clock: Box<dyn TimeSource>,
    issuer: Box<dyn TokenIssuer>,
}

impl GovernanceEngine {
    /// Build an engine over `store`. Fails with `InvalidConfig` if the
    /// configuration is not internally consistent.
    pub fn new(
        store: LedgerStore,
        config: DaoConfig,
        clock: Box<dyn TimeSource>,
        issuer: Box<dyn TokenIssuer>,
    ) -> Result<Self> {
        if config.quorum_pct > 100 {
            return Err(GovernanceError::InvalidConfig(format!(
                "quorum_pct must be 0-100, got {}",
                config.quorum_pct
            )));
        }
        let members = MembershipLedger::new(
            store.clone(),
            config.initial_member_grant,
            config.rejoin_policy,
        );
        let impact = ImpactRegistry::new(store.clone());
        Ok(GovernanceEngine {
            store,
            members,
            impact,
            config,
            clock,
            issuer,
        })
    }

    pub fn config(&self) -> &DaoConfig {
        &self.config
    }

    /// Membership ledger, for balance queries and top-ups issued by the
    /// surrounding environment.
    pub fn membership(&self) -> &MembershipLedger {
        &self.members
    }

    pub fn membership_mut(&mut self) -> &mut MembershipLedger {
        &mut self.members
    }

    /// Enroll `account` as a member, wiring the configured token issuer
    /// into the initial grant. Returns the resulting balance.
    pub fn join_dao(&mut self, account: &str) -> Result<u64> {
        self.members.grant_initial(account, self.issuer.as_ref())
    }

    /// Submit a funding proposal. Allocates the next sequential id from
    /// the persisted counter; the counter is authoritative and ids are
    /// never reused.
    pub fn submit_proposal(
        &mut self,
        caller: &str,
        title: &str,
        description: &str,
        funding_requested: u64,
    ) -> Result<u64> {
        if !self.members.is_member(caller)? {
            return Err(GovernanceError::NotAMember(caller.to_string()));
        }
        let held = self.members.balance_of(caller)?;
        if held < self.config.min_tokens_to_propose {
            return Err(GovernanceError::InsufficientTokensToPropose {
                required: self.config.min_tokens_to_propose,
                held,
            });
        }

        let id = self.next_proposal_id()?;
        let now = self.clock.now();
        let proposal = Proposal {
            id,
            title: title.to_string(),
            description: description.to_string(),
            funding_requested,
            proposer: caller.to_string(),
            created_at: now,
            ends_at: now + self.config.voting_period_secs,
            status: ProposalStatus::Pending,
        };

        self.store.put_many(vec![
            (keys::proposal(id), codec::encode_proposal(&proposal)),
            (keys::tally(id), codec::encode_tally(&VoteTally::default())),
            (keys::PROPOSAL_SEQ.to_vec(), codec::encode_counter(id + 1)),
        ])?;
        log::info!(
            "proposal {} submitted by {} requesting {}",
            id,
            caller,
            funding_requested
        );
        Ok(id)
    }

    /// Cast a token-weighted vote. The tally update and the voter
    /// record land in one batch, so neither is ever observable without
    /// the other. Voting power is checked against the balance, not
    /// debited from it.
    pub fn cast_vote(
        &mut self,
        caller: &str,
        proposal_id: u64,
        choice: VoteChoice,
        power: u64,
    ) -> Result<()> {
        let proposal = self.load_proposal(proposal_id)?;
        if proposal.status.is_terminal() {
            return Err(GovernanceError::AlreadyFinalized(proposal_id));
        }
        let now = self.clock.now();
        if !proposal.accepts_votes_at(now) {
            return Err(GovernanceError::VotingClosed(proposal_id));
        }
        if !self.members.is_member(caller)? {
            return Err(GovernanceError::NotAMember(caller.to_string()));
        }
        let held = self.members.balance_of(caller)?;
        if held < power {
            return Err(GovernanceError::InsufficientBalance {
                requested: power,
                held,
            });
        }
        let voter_key = keys::voter(proposal_id, caller);
        if self.store.exists(&voter_key)? {
            return Err(GovernanceError::AlreadyVoted {
                proposal_id,
                account: caller.to_string(),
            });
        }

        let mut tally = self.load_tally(proposal_id)?;
        tally.apply(choice, power)?;
        let record = VoterRecord {
            choice,
            power,
            timestamp: now,
        };
        self.store.put_many(vec![
            (keys::tally(proposal_id), codec::encode_tally(&tally)),
            (voter_key, codec::encode_voter_record(&record)),
        ])?;
        log::debug!(
            "vote on proposal {} by {}: {:?} with power {}",
            proposal_id,
            caller,
            choice,
            power
        );
        Ok(())
    }

    /// Finalize a proposal whose voting window has closed. A pure
    /// derivation from the committed tally, so by default anyone may
    /// call it; `admin_finalize_only` restricts it to the admin.
    pub fn finalize(&mut self, caller: &str, proposal_id: u64) -> Result<ProposalStatus> {
        if self.config.admin_finalize_only && caller != self.config.admin {
            return Err(GovernanceError::NotAuthorized(format!(
                "finalize is restricted to admin, called by {}",
                caller
            )));
        }
        let mut proposal = self.load_proposal(proposal_id)?;
        if proposal.status.is_terminal() {
            return Err(GovernanceError::AlreadyFinalized(proposal_id));
        }
        if self.clock.now() <= proposal.ends_at {
            return Err(GovernanceError::VotingStillOpen(proposal_id));
        }

        let tally = self.load_tally(proposal_id)?;
        // Truncating integer division, as documented: 1000 * 51 / 100 = 510.
        let quorum =
            ((self.config.total_token_supply as u128) * (self.config.quorum_pct as u128) / 100) as u64;
        let status = if tally.power_used < quorum {
            ProposalStatus::NoQuorum
        } else if tally.yes > tally.no {
            ProposalStatus::Approved
        } else {
            // Ties reject.
            ProposalStatus::Rejected
        };

        proposal.status = status;
        self.store
            .put(&keys::proposal(proposal_id), codec::encode_proposal(&proposal))?;
        log::info!(
            "proposal {} finalized as {:?} (yes {}, no {}, power {} / quorum {})",
            proposal_id,
            status,
            tally.yes,
            tally.no,
            tally.power_used,
            quorum
        );
        Ok(status)
    }

    /// Instruct the token issuer to pay reward credits to the proposer
    /// of an approved proposal. Deduplicated: a persisted award marker
    /// makes a repeat call fail instead of paying twice.
    pub fn award_credits(&mut self, caller: &str, proposal_id: u64, amount: u64) -> Result<()> {
        if caller != self.config.admin {
            return Err(GovernanceError::NotAuthorized(format!(
                "award_credits is restricted to admin, called by {}",
                caller
            )));
        }
        let proposal = self.load_proposal(proposal_id)?;
        if proposal.status != ProposalStatus::Approved {
            return Err(GovernanceError::ProposalNotApproved(proposal_id));
        }
        let award_key = keys::award(proposal_id);
        if self.store.exists(&award_key)? {
            return Err(GovernanceError::CreditsAlreadyAwarded(proposal_id));
        }

        self.issuer
            .mint_and_transfer(AssetKind::RewardCredit, &proposal.proposer, amount)?;
        // Audit marker: amount and award time.
        let mut marker = Vec::with_capacity(16);
        marker.extend_from_slice(&amount.to_be_bytes());
        marker.extend_from_slice(&self.clock.now().to_be_bytes());
        self.store.put(&award_key, marker)?;
        log::info!(
            "awarded {} credits for proposal {} to {}",
            amount,
            proposal_id,
            proposal.proposer
        );
        Ok(())
    }

    /// Register a climate project with the impact registry.
    #[allow(clippy::too_many_arguments)]
    pub fn register_project(
        &mut self,
        name: &str,
        project_type: &str,
        expected_co2: u64,
        expected_trees: u64,
        expected_energy: u64,
        location: &str,
    ) -> Result<u64> {
        let id = self.impact.register_project(
            name,
            project_type,
            expected_co2,
            expected_trees,
            expected_energy,
            location,
        )?;
        Ok(id)
    }

    /// Score lookup, the only path by which governance consumes the
    /// impact registry.
    pub fn project_score(&self, project_id: u64) -> Result<u64> {
        Ok(self.impact.get_score(project_id)?)
    }

    pub fn proposal(&self, proposal_id: u64) -> Result<Proposal> {
        self.load_proposal(proposal_id)
    }

    pub fn tally(&self, proposal_id: u64) -> Result<VoteTally> {
        self.load_tally(proposal_id)
    }

    /// Audit-trail read of a committed vote, if any.
    pub fn voter_record(&self, proposal_id: u64, account: &str) -> Result<Option<VoterRecord>> {
        match self.store.get(&keys::voter(proposal_id, account))? {
            Some(bytes) => Ok(Some(codec::decode_voter_record(&bytes)?)),
            None => Ok(None),
        }
    }

    fn load_proposal(&self, proposal_id: u64) -> Result<Proposal> {
        match self.store.get(&keys::proposal(proposal_id))? {
            Some(bytes) => codec::decode_proposal(&bytes),
            None => Err(GovernanceError::ProposalNotFound(proposal_id)),
        }
    }

    fn load_tally(&self, proposal_id: u64) -> Result<VoteTally> {
        match self.store.get(&keys::tally(proposal_id))? {
            Some(bytes) => codec::decode_tally(&bytes),
            None => Err(GovernanceError::ProposalNotFound(proposal_id)),
        }
    }

    fn next_proposal_id(&self) -> Result<u64> {
        match self.store.get(keys::PROPOSAL_SEQ)? {
            Some(bytes) => codec::decode_counter(&bytes),
            None => Ok(0),
        }
    }
}
