//! Key space of the governance ledger
//!
//! One record per `(type, id)` pair; the type prefix keeps entity types
//! from colliding. Account ids sit at the tail of composite keys so a
//! key can never be ambiguous.

pub fn proposal(id: u64) -> Vec<u8> {
    format!("proposal:{}", id).into_bytes()
}

pub fn tally(id: u64) -> Vec<u8> {
    format!("tally:{}", id).into_bytes()
}

pub fn voter(proposal_id: u64, account: &str) -> Vec<u8> {
    format!("voter:{}:{}", proposal_id, account).into_bytes()
}

pub fn member(account: &str) -> Vec<u8> {
    format!("member:{}", account).into_bytes()
}

pub fn award(proposal_id: u64) -> Vec<u8> {
    format!("award:{}", proposal_id).into_bytes()
}

/// Next-proposal-id counter; authoritative even if a later proposal is
/// never created.
pub const PROPOSAL_SEQ: &[u8] = b"seq:proposal";

/// Total number of members ever granted an initial balance.
pub const MEMBER_COUNT: &[u8] = b"seq:member";
