//! Practitioner and branch lookup used to denormalize availability answers.
//!
//! The authoritative user and branch tables belong to other services. The
//! [`ClinicDirectory`] holds the handful of display fields this crate needs
//! (names, codes, approval flag) and is filled from seed data or by the
//! caller at startup.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::{BranchId, OptometristId};

/// Display data for an optometrist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Optometrist {
    /// Practitioner id.
    pub id: OptometristId,
    /// Display name.
    pub name: String,
    /// Only approved optometrists are offered for booking.
    #[serde(default = "default_approved")]
    pub is_approved: bool,
}

fn default_approved() -> bool {
    true
}

/// Display data for a branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    /// Branch id.
    pub id: BranchId,
    /// Display name.
    pub name: String,
    /// Short branch code, e.g. `"MNL"`.
    #[serde(default)]
    pub code: String,
    /// Street address.
    #[serde(default)]
    pub address: String,
}

/// In-memory directory of optometrists and branches.
///
/// Keyed by ordered maps so iteration (and therefore "first approved
/// optometrist") is deterministic by id.
#[derive(Debug, Default)]
pub struct ClinicDirectory {
    optometrists: RwLock<BTreeMap<OptometristId, Optometrist>>,
    branches: RwLock<BTreeMap<BranchId, Branch>>,
}

impl ClinicDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an optometrist.
    pub async fn upsert_optometrist(&self, optometrist: Optometrist) {
        self.optometrists
            .write()
            .await
            .insert(optometrist.id, optometrist);
    }

    /// Inserts or replaces a branch.
    pub async fn upsert_branch(&self, branch: Branch) {
        self.branches.write().await.insert(branch.id, branch);
    }

    /// Looks up an optometrist.
    pub async fn optometrist(&self, id: OptometristId) -> Option<Optometrist> {
        self.optometrists.read().await.get(&id).cloned()
    }

    /// Looks up a branch.
    pub async fn branch(&self, id: BranchId) -> Option<Branch> {
        self.branches.read().await.get(&id).cloned()
    }

    /// Approved optometrists in ascending id order.
    pub async fn approved_optometrists(&self) -> Vec<Optometrist> {
        self.optometrists
            .read()
            .await
            .values()
            .filter(|o| o.is_approved)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn optometrist(id: u64, approved: bool) -> Optometrist {
        Optometrist {
            id: OptometristId::new(id),
            name: format!("Dr. {id}"),
            is_approved: approved,
        }
    }

    #[tokio::test]
    async fn approved_list_skips_unapproved_in_id_order() {
        let directory = ClinicDirectory::new();
        directory.upsert_optometrist(optometrist(9, true)).await;
        directory.upsert_optometrist(optometrist(2, false)).await;
        directory.upsert_optometrist(optometrist(4, true)).await;

        let ids: Vec<u64> = directory
            .approved_optometrists()
            .await
            .iter()
            .map(|o| o.id.get())
            .collect();
        assert_eq!(ids, vec![4, 9]);
    }

    #[tokio::test]
    async fn branch_lookup() {
        let directory = ClinicDirectory::new();
        directory
            .upsert_branch(Branch {
                id: BranchId::new(1),
                name: "Downtown".to_string(),
                code: "DTN".to_string(),
                address: "1 Main St".to_string(),
            })
            .await;
        let Some(branch) = directory.branch(BranchId::new(1)).await else {
            panic!("branch should exist");
        };
        assert_eq!(branch.name, "Downtown");
        assert!(directory.branch(BranchId::new(2)).await.is_none());
    }

    #[test]
    fn optometrist_defaults_to_approved() {
        let Ok(o) = serde_json::from_str::<Optometrist>(r#"{"id": 1, "name": "Dr. Reyes"}"#) else {
            panic!("should deserialize");
        };
        assert!(o.is_approved);
    }
}
