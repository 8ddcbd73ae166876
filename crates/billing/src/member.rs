//! Member and branch profiles referenced by receipts.

use serde::{Deserialize, Serialize};

use gymdesk_core::{BranchId, Entity, MemberId, TenantId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub tenant_id: TenantId,
    #[serde(default)]
    pub branch_id: Option<BranchId>,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
}

impl Entity for Member {
    type Id = MemberId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Branch header printed on receipts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchProfile {
    pub id: BranchId,
    pub tenant_id: TenantId,
    pub gym_name: String,
    pub branch_name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl Entity for BranchProfile {
    type Id = BranchId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl BranchProfile {
    /// `"Iron Temple - Andheri"`, or just the gym name when the branch is unnamed.
    pub fn display_name(&self) -> String {
        let branch = self.branch_name.trim();
        if branch.is_empty() {
            self.gym_name.clone()
        } else {
            format!("{} - {}", self.gym_name, branch)
        }
    }
}
