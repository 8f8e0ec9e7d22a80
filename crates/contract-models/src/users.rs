use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A user of a provider organisation, with the roles they hold there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserContact {
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub roles: BTreeSet<String>,
}

impl UserContact {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(role.name())
    }
}

/// Authorization roles which gate the notifications a user receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    ViewContractsAndAgreements,
    SignContractsAndAgreements,
    ViewFundingClaimsAndReconciliationStatements,
    SignFundingClaims,
    ViewSubcontractorDeclarations,
    SubmitSubcontractorDeclarations,
}

impl Role {
    pub fn name(&self) -> &'static str {
        match self {
            Role::ViewContractsAndAgreements => "ViewContractsAndAgreements",
            Role::SignContractsAndAgreements => "SignContractsAndAgreements",
            Role::ViewFundingClaimsAndReconciliationStatements => {
                "ViewFundingClaimsAndReconciliationStatements"
            }
            Role::SignFundingClaims => "SignFundingClaims",
            Role::ViewSubcontractorDeclarations => "ViewSubcontractorDeclarations",
            Role::SubmitSubcontractorDeclarations => "SubmitSubcontractorDeclarations",
        }
    }

    /// Render `roles` the way they appear in audit and log messages,
    /// e.g. `[ViewContractsAndAgreements, SignContractsAndAgreements]`.
    pub fn display_list(roles: &[Role]) -> String {
        let names: Vec<&str> = roles.iter().map(Role::name).collect();
        format!("[{}]", names.join(", "))
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
