use tracing::debug;

use crate::error::{IdentityError, Result};
use crate::provider::IdentityProvider;

/// Exchange an authenticated user's identity for a Google-scoped bearer
/// token. One outbound call, no retries; failures are terminal for the
/// request and carried back to the caller with the upstream status intact.
pub async fn resolve_google_token(
    provider: &dyn IdentityProvider,
    user_id: &str,
) -> Result<String> {
    let tokens = provider.google_oauth_tokens(user_id).await?;

    let token = tokens
        .into_iter()
        .find_map(|t| t.token.filter(|v| !v.is_empty()))
        .ok_or(IdentityError::NoTokenFound)?;

    debug!(%user_id, "resolved Google OAuth token");
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{OauthAccessToken, OrgMember, OrgRole, Organization};
    use async_trait::async_trait;
    use bizdash_core::Session;

    struct FakeProvider {
        tokens: std::result::Result<Vec<OauthAccessToken>, (u16, String)>,
    }

    #[async_trait]
    impl IdentityProvider for FakeProvider {
        async fn session_user(&self, _session_token: &str) -> Result<Session> {
            unimplemented!()
        }

        async fn google_oauth_tokens(&self, _user_id: &str) -> Result<Vec<OauthAccessToken>> {
            match &self.tokens {
                Ok(tokens) => Ok(tokens.clone()),
                Err((status, body)) => Err(IdentityError::TokenUnavailable {
                    status: *status,
                    body: body.clone(),
                }),
            }
        }

        async fn get_organization(&self, _org_id: &str) -> Result<Organization> {
            unimplemented!()
        }
        async fn create_organization(
            &self,
            _name: &str,
            _created_by: &str,
        ) -> Result<Organization> {
            unimplemented!()
        }
        async fn update_organization(&self, _org_id: &str, _name: &str) -> Result<Organization> {
            unimplemented!()
        }
        async fn delete_organization(&self, _org_id: &str) -> Result<()> {
            unimplemented!()
        }
        async fn list_members(&self, _org_id: &str) -> Result<Vec<OrgMember>> {
            unimplemented!()
        }
        async fn add_member(
            &self,
            _org_id: &str,
            _user_id: &str,
            _role: OrgRole,
        ) -> Result<OrgMember> {
            unimplemented!()
        }
        async fn update_member_role(
            &self,
            _org_id: &str,
            _user_id: &str,
            _role: OrgRole,
        ) -> Result<OrgMember> {
            unimplemented!()
        }
        async fn remove_member(&self, _org_id: &str, _user_id: &str) -> Result<()> {
            unimplemented!()
        }
        async fn set_avatar_url(&self, _user_id: &str, _url: &str) -> Result<()> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn returns_first_non_empty_token() {
        let provider = FakeProvider {
            tokens: Ok(vec![
                OauthAccessToken { token: None },
                OauthAccessToken {
                    token: Some("ya29.abc".into()),
                },
            ]),
        };
        let token = resolve_google_token(&provider, "user_1").await.unwrap();
        assert_eq!(token, "ya29.abc");
    }

    #[tokio::test]
    async fn empty_token_list_is_no_token_found() {
        let provider = FakeProvider { tokens: Ok(vec![]) };
        let err = resolve_google_token(&provider, "user_1")
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::NoTokenFound));
    }

    #[tokio::test]
    async fn missing_token_field_is_no_token_found() {
        let provider = FakeProvider {
            tokens: Ok(vec![OauthAccessToken { token: None }]),
        };
        let err = resolve_google_token(&provider, "user_1")
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::NoTokenFound));
    }

    #[tokio::test]
    async fn upstream_failure_carries_status_and_body() {
        let provider = FakeProvider {
            tokens: Err((503, "upstream down".into())),
        };
        let err = resolve_google_token(&provider, "user_1")
            .await
            .unwrap_err();
        match err {
            IdentityError::TokenUnavailable { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "upstream down");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
