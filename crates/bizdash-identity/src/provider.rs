use std::time::Duration;

use async_trait::async_trait;
use bizdash_core::{IdentityConfig, Session};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::error::{IdentityError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrgRole {
    Admin,
    BasicMember,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrgMember {
    pub user_id: String,
    pub role: OrgRole,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OauthAccessToken {
    #[serde(default)]
    pub token: Option<String>,
}

/// Seam over the identity provider's backend API. Everything this system
/// knows about users, sessions and organizations comes through here.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve a session token to the user it belongs to.
    async fn session_user(&self, session_token: &str) -> Result<Session>;

    /// The provider-stored Google OAuth tokens for a user. May be empty.
    async fn google_oauth_tokens(&self, user_id: &str) -> Result<Vec<OauthAccessToken>>;

    async fn get_organization(&self, org_id: &str) -> Result<Organization>;
    async fn create_organization(&self, name: &str, created_by: &str) -> Result<Organization>;
    async fn update_organization(&self, org_id: &str, name: &str) -> Result<Organization>;
    async fn delete_organization(&self, org_id: &str) -> Result<()>;

    async fn list_members(&self, org_id: &str) -> Result<Vec<OrgMember>>;
    async fn add_member(&self, org_id: &str, user_id: &str, role: OrgRole) -> Result<OrgMember>;
    async fn update_member_role(
        &self,
        org_id: &str,
        user_id: &str,
        role: OrgRole,
    ) -> Result<OrgMember>;
    async fn remove_member(&self, org_id: &str, user_id: &str) -> Result<()>;

    /// Record the served URL of a freshly uploaded avatar on the user.
    async fn set_avatar_url(&self, user_id: &str, url: &str) -> Result<()>;
}

/// reqwest-backed implementation against the provider's management REST API,
/// bearer-authenticated with the server secret.
pub struct HttpIdentityProvider {
    config: IdentityConfig,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    user_id: String,
    #[serde(default)]
    status: Option<String>,
}

impl HttpIdentityProvider {
    pub fn new(config: IdentityConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    async fn check(&self, resp: reqwest::Response) -> Result<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(IdentityError::NotFound(body));
        }
        Err(IdentityError::Upstream {
            status: status.as_u16(),
            message: body,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth(&self.config.api_secret)
            .send()
            .await?;
        Ok(self.check(resp).await?.json().await?)
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn session_user(&self, session_token: &str) -> Result<Session> {
        let resp = self
            .client
            .get(self.url(&format!("/sessions/{session_token}")))
            .bearer_auth(&self.config.api_secret)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "session lookup rejected");
            return Err(IdentityError::Unauthenticated);
        }

        let session: SessionResponse = resp.json().await?;
        if matches!(session.status.as_deref(), Some(s) if s != "active") {
            return Err(IdentityError::Unauthenticated);
        }
        Ok(Session {
            user_id: session.user_id,
        })
    }

    async fn google_oauth_tokens(&self, user_id: &str) -> Result<Vec<OauthAccessToken>> {
        let resp = self
            .client
            .get(self.url(&format!("/users/{user_id}/oauth_access_tokens/google")))
            .bearer_auth(&self.config.api_secret)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(IdentityError::TokenUnavailable {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.json().await?)
    }

    async fn get_organization(&self, org_id: &str) -> Result<Organization> {
        self.get_json(&format!("/organizations/{org_id}")).await
    }

    async fn create_organization(&self, name: &str, created_by: &str) -> Result<Organization> {
        let resp = self
            .client
            .post(self.url("/organizations"))
            .bearer_auth(&self.config.api_secret)
            .json(&json!({ "name": name, "created_by": created_by }))
            .send()
            .await?;
        Ok(self.check(resp).await?.json().await?)
    }

    async fn update_organization(&self, org_id: &str, name: &str) -> Result<Organization> {
        let resp = self
            .client
            .patch(self.url(&format!("/organizations/{org_id}")))
            .bearer_auth(&self.config.api_secret)
            .json(&json!({ "name": name }))
            .send()
            .await?;
        Ok(self.check(resp).await?.json().await?)
    }

    async fn delete_organization(&self, org_id: &str) -> Result<()> {
        let resp = self
            .client
            .delete(self.url(&format!("/organizations/{org_id}")))
            .bearer_auth(&self.config.api_secret)
            .send()
            .await?;
        self.check(resp).await?;
        Ok(())
    }

    async fn list_members(&self, org_id: &str) -> Result<Vec<OrgMember>> {
        self.get_json(&format!("/organizations/{org_id}/memberships"))
            .await
    }

    async fn add_member(&self, org_id: &str, user_id: &str, role: OrgRole) -> Result<OrgMember> {
        let resp = self
            .client
            .post(self.url(&format!("/organizations/{org_id}/memberships")))
            .bearer_auth(&self.config.api_secret)
            .json(&json!({ "user_id": user_id, "role": role }))
            .send()
            .await?;
        Ok(self.check(resp).await?.json().await?)
    }

    async fn update_member_role(
        &self,
        org_id: &str,
        user_id: &str,
        role: OrgRole,
    ) -> Result<OrgMember> {
        let resp = self
            .client
            .patch(self.url(&format!("/organizations/{org_id}/memberships/{user_id}")))
            .bearer_auth(&self.config.api_secret)
            .json(&json!({ "role": role }))
            .send()
            .await?;
        Ok(self.check(resp).await?.json().await?)
    }

    async fn remove_member(&self, org_id: &str, user_id: &str) -> Result<()> {
        let resp = self
            .client
            .delete(self.url(&format!("/organizations/{org_id}/memberships/{user_id}")))
            .bearer_auth(&self.config.api_secret)
            .send()
            .await?;
        self.check(resp).await?;
        Ok(())
    }

    async fn set_avatar_url(&self, user_id: &str, url: &str) -> Result<()> {
        let resp = self
            .client
            .patch(self.url(&format!("/users/{user_id}")))
            .bearer_auth(&self.config.api_secret)
            .json(&json!({ "public_metadata": { "avatar_url": url } }))
            .send()
            .await?;
        self.check(resp).await?;
        Ok(())
    }
}
