use std::sync::Arc;

use tracing::info;

use crate::error::{IdentityError, Result};
use crate::provider::{IdentityProvider, OrgMember, OrgRole, Organization};

/// Organization management over the identity provider, plus the one business
/// rule the provider does not enforce: an organization must always keep at
/// least one admin.
pub struct OrgService {
    provider: Arc<dyn IdentityProvider>,
}

impl OrgService {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }

    pub async fn get(&self, org_id: &str) -> Result<Organization> {
        self.provider.get_organization(org_id).await
    }

    pub async fn create(&self, name: &str, created_by: &str) -> Result<Organization> {
        if name.trim().is_empty() {
            return Err(IdentityError::Validation(
                "organization name must not be empty".into(),
            ));
        }
        let org = self.provider.create_organization(name, created_by).await?;
        info!(org_id = %org.id, "organization created");
        Ok(org)
    }

    pub async fn rename(&self, org_id: &str, name: &str) -> Result<Organization> {
        if name.trim().is_empty() {
            return Err(IdentityError::Validation(
                "organization name must not be empty".into(),
            ));
        }
        self.provider.update_organization(org_id, name).await
    }

    pub async fn delete(&self, org_id: &str) -> Result<()> {
        self.provider.delete_organization(org_id).await
    }

    pub async fn members(&self, org_id: &str) -> Result<Vec<OrgMember>> {
        self.provider.list_members(org_id).await
    }

    pub async fn add_member(
        &self,
        org_id: &str,
        user_id: &str,
        role: OrgRole,
    ) -> Result<OrgMember> {
        self.provider.add_member(org_id, user_id, role).await
    }

    /// Change a member's role. Demoting the only admin is refused before any
    /// write is issued.
    pub async fn update_member_role(
        &self,
        org_id: &str,
        user_id: &str,
        role: OrgRole,
    ) -> Result<OrgMember> {
        if role != OrgRole::Admin {
            self.ensure_not_last_admin(org_id, user_id).await?;
        }
        self.provider.update_member_role(org_id, user_id, role).await
    }

    /// Remove a member. Removing the only admin is refused before any write
    /// is issued.
    pub async fn remove_member(&self, org_id: &str, user_id: &str) -> Result<()> {
        self.ensure_not_last_admin(org_id, user_id).await?;
        self.provider.remove_member(org_id, user_id).await
    }

    /// Organization mutations require the caller to hold the admin role in
    /// that organization.
    pub async fn require_admin(&self, org_id: &str, user_id: &str) -> Result<()> {
        let members = self.provider.list_members(org_id).await?;
        let is_admin = members
            .iter()
            .any(|m| m.user_id == user_id && m.role == OrgRole::Admin);
        if !is_admin {
            return Err(IdentityError::Forbidden(
                "organization admin role required".into(),
            ));
        }
        Ok(())
    }

    async fn ensure_not_last_admin(&self, org_id: &str, user_id: &str) -> Result<()> {
        let members = self.provider.list_members(org_id).await?;

        let admins: Vec<&OrgMember> = members
            .iter()
            .filter(|m| m.role == OrgRole::Admin)
            .collect();
        let target_is_admin = admins.iter().any(|m| m.user_id == user_id);

        if target_is_admin && admins.len() == 1 {
            return Err(IdentityError::Validation(
                "cannot remove or demote the last admin of an organization".into(),
            ));
        }
        Ok(())
    }
}
