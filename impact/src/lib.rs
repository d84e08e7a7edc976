//! Impact registry
//!
//! Registers climate projects and assigns each a bounded score from a
//! fixed weighted formula over its expected CO2 reduction, trees
//! planted, and renewable energy generated. The governance engine only
//! consumes the registry through [`ImpactRegistry::get_score`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use dao_store::LedgerStore;

/// Scores are clamped to 0..=1000.
pub const MAX_SCORE: u64 = 1_000;

#[derive(Error, Debug)]
pub enum ImpactError {
    #[error("project {0} not found")]
    ProjectNotFound(u64),

    #[error("corrupt project record: {0}")]
    CorruptRecord(String),

    #[error("ledger store error: {0}")]
    Store(#[from] dao_store::StoreError),
}

pub type Result<T> = std::result::Result<T, ImpactError>;

/// A registered project with its computed score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Project {
    pub id: u64,
    pub name: String,
    pub project_type: String,
    pub expected_co2: u64,
    pub expected_trees: u64,
    pub expected_energy: u64,
    pub location: String,
    pub score: u64,
}

/// Weighted impact score: 40% CO2 (tonnes), 30% trees (per thousand),
/// 30% energy (MWh), clamped to [`MAX_SCORE`]. Integer arithmetic with
/// wide intermediates; identical inputs always produce the identical
/// score.
pub fn impact_score(co2: u64, trees: u64, energy: u64) -> u64 {
    let raw = (co2 as u128) * 40 / 100 + (trees as u128) * 30 / 1_000 + (energy as u128) * 30 / 100;
    raw.min(MAX_SCORE as u128) as u64
}

pub struct ImpactRegistry {
    store: LedgerStore,
}

const PROJECT_SEQ: &[u8] = b"seq:project";

fn project_key(id: u64) -> Vec<u8> {
    format!("project:{}", id).into_bytes()
}

impl ImpactRegistry {
    pub fn new(store: LedgerStore) -> Self {
        ImpactRegistry { store }
    }

    /// Register a project and compute its score once. Each registration
    /// gets a fresh id, even for identical inputs.
    pub fn register_project(
        &mut self,
        name: &str,
        project_type: &str,
        expected_co2: u64,
        expected_trees: u64,
        expected_energy: u64,
        location: &str,
    ) -> Result<u64> {
        let id = self.next_id()?;
        let project = Project {
            id,
            name: name.to_string(),
            project_type: project_type.to_string(),
            expected_co2,
            expected_trees,
            expected_energy,
            location: location.to_string(),
            score: impact_score(expected_co2, expected_trees, expected_energy),
        };
        let value = bincode::serialize(&project)
            .map_err(|e| ImpactError::CorruptRecord(e.to_string()))?;
        self.store.put_many(vec![
            (project_key(id), value),
            (PROJECT_SEQ.to_vec(), (id + 1).to_be_bytes().to_vec()),
        ])?;
        Ok(id)
    }

    pub fn get_project(&self, id: u64) -> Result<Project> {
        match self.store.get(&project_key(id))? {
            Some(bytes) => bincode::deserialize(&bytes)
                .map_err(|e| ImpactError::CorruptRecord(e.to_string())),
            None => Err(ImpactError::ProjectNotFound(id)),
        }
    }

    pub fn get_score(&self, id: u64) -> Result<u64> {
        Ok(self.get_project(id)?.score)
    }

    fn next_id(&self) -> Result<u64> {
        match self.store.get(PROJECT_SEQ)? {
            Some(bytes) => {
                let raw: [u8; 8] = bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| ImpactError::CorruptRecord("bad project counter".to_string()))?;
                Ok(u64::from_be_bytes(raw))
            }
            None => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn registry() -> (tempfile::TempDir, ImpactRegistry) {
        let dir = tempdir().unwrap();
        let store = LedgerStore::open(dir.path()).unwrap();
        (dir, ImpactRegistry::new(store))
    }

    #[test]
    fn test_score_formula() {
        // 100*40/100 + 1000*30/1000 + 100*30/100 = 40 + 30 + 30
        assert_eq!(impact_score(100, 1_000, 100), 100);
        assert_eq!(impact_score(0, 0, 0), 0);
    }

    #[test]
    fn test_score_clamped_at_max() {
        assert_eq!(impact_score(1_000_000, 0, 0), MAX_SCORE);
        assert_eq!(impact_score(u64::MAX, u64::MAX, u64::MAX), MAX_SCORE);
    }

    #[test]
    fn test_register_and_lookup() {
        let (_dir, mut registry) = registry();

        let id = registry
            .register_project("Mangrove belt", "reforestation", 50, 20_000, 0, "Kenya")
            .unwrap();
        let project = registry.get_project(id).unwrap();

        assert_eq!(project.name, "Mangrove belt");
        assert_eq!(project.score, 50 * 40 / 100 + 20_000 * 30 / 1_000);
        assert_eq!(registry.get_score(id).unwrap(), project.score);
    }

    #[test]
    fn test_identical_inputs_distinct_ids_same_score() {
        let (_dir, mut registry) = registry();

        let a = registry
            .register_project("Solar farm", "renewable_energy", 120, 0, 900, "Chile")
            .unwrap();
        let b = registry
            .register_project("Solar farm", "renewable_energy", 120, 0, 900, "Chile")
            .unwrap();

        assert_ne!(a, b);
        assert_eq!(registry.get_score(a).unwrap(), registry.get_score(b).unwrap());
    }

    #[test]
    fn test_absent_project() {
        let (_dir, registry) = registry();
        assert!(matches!(
            registry.get_score(42).unwrap_err(),
            ImpactError::ProjectNotFound(42)
        ));
    }
}
