//! Canonical binary codec for the governance records
//!
//! One deterministic layout per record type: u64 fields are fixed-width
//! big-endian, strings carry a u32 big-endian length prefix followed by
//! UTF-8 bytes, enums are a single validated byte. Length prefixes mean
//! free-text fields can never forge a field boundary. Malformed input
//! (truncation, bad enum byte, bad UTF-8, trailing bytes) decodes to
//! `CorruptRecord`, never to zeroed fields.

use crate::error::{GovernanceError, Result};
use crate::records::{MemberBalance, Proposal, VoteTally, VoterRecord};

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Reader { buf, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.buf.len())
            .ok_or_else(|| {
                GovernanceError::CorruptRecord(format!(
                    "truncated record: wanted {} bytes at offset {}, have {}",
                    n,
                    self.pos,
                    self.buf.len()
                ))
            })?;
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u64(&mut self) -> Result<u64> {
        let bytes = self.take(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(u64::from_be_bytes(raw))
    }

    fn string(&mut self) -> Result<String> {
        let len_bytes = self.take(4)?;
        let mut raw = [0u8; 4];
        raw.copy_from_slice(len_bytes);
        let len = u32::from_be_bytes(raw) as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| GovernanceError::CorruptRecord(format!("invalid UTF-8 in string field: {}", e)))
    }

    /// Every decoder must consume the record exactly.
    fn finish(self) -> Result<()> {
        if self.pos != self.buf.len() {
            return Err(GovernanceError::CorruptRecord(format!(
                "{} trailing bytes after record",
                self.buf.len() - self.pos
            )));
        }
        Ok(())
    }
}

fn put_u64(out: &mut Vec<u8>, v: u64) {
    out.extend_from_slice(&v.to_be_bytes());
}

fn put_string(out: &mut Vec<u8>, s: &str) {
    out.extend_from_slice(&(s.len() as u32).to_be_bytes());
    out.extend_from_slice(s.as_bytes());
}

pub fn encode_proposal(p: &Proposal) -> Vec<u8> {
    let mut out = Vec::new();
    put_u64(&mut out, p.id);
    put_string(&mut out, &p.title);
    put_string(&mut out, &p.description);
    put_u64(&mut out, p.funding_requested);
    put_string(&mut out, &p.proposer);
    put_u64(&mut out, p.created_at);
    put_u64(&mut out, p.ends_at);
    out.push(p.status.to_byte());
    out
}

pub fn decode_proposal(bytes: &[u8]) -> Result<Proposal> {
    let mut r = Reader::new(bytes);
    let proposal = Proposal {
        id: r.u64()?,
        title: r.string()?,
        description: r.string()?,
        funding_requested: r.u64()?,
        proposer: r.string()?,
        created_at: r.u64()?,
        ends_at: r.u64()?,
        status: crate::records::ProposalStatus::from_byte(r.u8()?)?,
    };
    r.finish()?;
    Ok(proposal)
}

pub fn encode_tally(t: &VoteTally) -> Vec<u8> {
    let mut out = Vec::with_capacity(40);
    put_u64(&mut out, t.yes);
    put_u64(&mut out, t.no);
    put_u64(&mut out, t.abstain);
    put_u64(&mut out, t.voters);
    put_u64(&mut out, t.power_used);
    out
}

pub fn decode_tally(bytes: &[u8]) -> Result<VoteTally> {
    let mut r = Reader::new(bytes);
    let tally = VoteTally {
        yes: r.u64()?,
        no: r.u64()?,
        abstain: r.u64()?,
        voters: r.u64()?,
        power_used: r.u64()?,
    };
    r.finish()?;
    Ok(tally)
}

pub fn encode_voter_record(v: &VoterRecord) -> Vec<u8> {
    let mut out = Vec::with_capacity(17);
    out.push(v.choice.to_byte());
    put_u64(&mut out, v.power);
    put_u64(&mut out, v.timestamp);
    out
}

pub fn decode_voter_record(bytes: &[u8]) -> Result<VoterRecord> {
    let mut r = Reader::new(bytes);
    let record = VoterRecord {
        choice: crate::records::VoteChoice::from_byte(r.u8()?)?,
        power: r.u64()?,
        timestamp: r.u64()?,
    };
    r.finish()?;
    Ok(record)
}

pub fn encode_member_balance(m: &MemberBalance) -> Vec<u8> {
    m.balance.to_be_bytes().to_vec()
}

pub fn decode_member_balance(bytes: &[u8]) -> Result<MemberBalance> {
    let mut r = Reader::new(bytes);
    let balance = MemberBalance { balance: r.u64()? };
    r.finish()?;
    Ok(balance)
}

/// Big-endian u64 counters for the `seq:*` keys.
pub fn encode_counter(v: u64) -> Vec<u8> {
    v.to_be_bytes().to_vec()
}

pub fn decode_counter(bytes: &[u8]) -> Result<u64> {
    let mut r = Reader::new(bytes);
    let v = r.u64()?;
    r.finish()?;
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{ProposalStatus, VoteChoice};

    fn sample_proposal() -> Proposal {
        Proposal {
            id: 7,
            title: "Reforest the valley".to_string(),
            description: "Plant 10k native trees".to_string(),
            funding_requested: 25_000,
            proposer: "ALICE3YCNRIUFVGOIX".to_string(),
            created_at: 1_700_000_000,
            ends_at: 1_700_604_800,
            status: ProposalStatus::Pending,
        }
    }

    #[test]
    fn test_proposal_roundtrip() {
        let p = sample_proposal();
        assert_eq!(decode_proposal(&encode_proposal(&p)).unwrap(), p);
    }

    #[test]
    fn test_proposal_roundtrip_with_delimiter_bytes_in_text() {
        // Free text must never be able to forge a field boundary.
        let mut p = sample_proposal();
        p.title = "a|b:c\0d".to_string();
        p.description = "|||:::".to_string();
        assert_eq!(decode_proposal(&encode_proposal(&p)).unwrap(), p);
    }

    #[test]
    fn test_tally_roundtrip() {
        let t = VoteTally {
            yes: 400,
            no: 200,
            abstain: 5,
            voters: 3,
            power_used: 605,
        };
        assert_eq!(decode_tally(&encode_tally(&t)).unwrap(), t);
    }

    #[test]
    fn test_voter_record_roundtrip() {
        let v = VoterRecord {
            choice: VoteChoice::No,
            power: 120,
            timestamp: 42,
        };
        assert_eq!(decode_voter_record(&encode_voter_record(&v)).unwrap(), v);
    }

    #[test]
    fn test_member_balance_roundtrip() {
        let m = MemberBalance { balance: 9_999 };
        assert_eq!(
            decode_member_balance(&encode_member_balance(&m)).unwrap(),
            m
        );
    }

    #[test]
    fn test_truncated_proposal_is_corrupt() {
        let bytes = encode_proposal(&sample_proposal());
        let err = decode_proposal(&bytes[..bytes.len() - 3]).unwrap_err();
        assert!(matches!(err, crate::error::GovernanceError::CorruptRecord(_)));
    }

    #[test]
    fn test_trailing_bytes_are_corrupt() {
        let mut bytes = encode_tally(&VoteTally::default());
        bytes.push(0);
        let err = decode_tally(&bytes).unwrap_err();
        assert!(matches!(err, crate::error::GovernanceError::CorruptRecord(_)));
    }

    #[test]
    fn test_bad_status_byte_is_corrupt() {
        let mut bytes = encode_proposal(&sample_proposal());
        *bytes.last_mut().unwrap() = 9;
        let err = decode_proposal(&bytes).unwrap_err();
        assert!(matches!(err, crate::error::GovernanceError::CorruptRecord(_)));
    }

    #[test]
    fn test_bad_utf8_is_corrupt() {
        let p = sample_proposal();
        let mut bytes = encode_proposal(&p);
        // First string byte sits after the id and the title length prefix.
        bytes[12] = 0xFF;
        let err = decode_proposal(&bytes).unwrap_err();
        assert!(matches!(err, crate::error::GovernanceError::CorruptRecord(_)));
    }

    #[test]
    fn test_member_balance_wrong_length_is_corrupt() {
        assert!(decode_member_balance(&[0; 7]).is_err());
        assert!(decode_member_balance(&[0; 9]).is_err());
    }
}
