use std::sync::Arc;

use async_trait::async_trait;
use axum_test::TestServer;
use bizdash_api::{create_router, AppState};
use bizdash_core::{BusinessAccount, BusinessLocation, Config, Endpoint, Session};
use bizdash_gbp::{BusinessProfileApi, DailyMetricSeries, GbpError, ReviewsPage};
use bizdash_identity::{
    IdentityError, IdentityProvider, OauthAccessToken, OrgMember, OrgRole, Organization,
};

const SESSION_TOKEN: &str = "sess_valid";
const USER_ID: &str = "user_1";

// ---- fakes ----

struct FakeIdentity {
    members: Vec<OrgMember>,
}

impl FakeIdentity {
    fn new() -> Self {
        Self {
            members: vec![OrgMember {
                user_id: USER_ID.to_string(),
                role: OrgRole::Admin,
            }],
        }
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn session_user(&self, session_token: &str) -> Result<Session, IdentityError> {
        if session_token == SESSION_TOKEN {
            Ok(Session {
                user_id: USER_ID.to_string(),
            })
        } else {
            Err(IdentityError::Unauthenticated)
        }
    }

    async fn google_oauth_tokens(
        &self,
        _user_id: &str,
    ) -> Result<Vec<OauthAccessToken>, IdentityError> {
        Ok(vec![OauthAccessToken {
            token: Some("ya29.test".to_string()),
        }])
    }

    async fn get_organization(&self, org_id: &str) -> Result<Organization, IdentityError> {
        Ok(Organization {
            id: org_id.to_string(),
            name: "Acme".to_string(),
            slug: None,
        })
    }

    async fn create_organization(
        &self,
        name: &str,
        _created_by: &str,
    ) -> Result<Organization, IdentityError> {
        Ok(Organization {
            id: "org_new".to_string(),
            name: name.to_string(),
            slug: None,
        })
    }

    async fn update_organization(
        &self,
        org_id: &str,
        name: &str,
    ) -> Result<Organization, IdentityError> {
        Ok(Organization {
            id: org_id.to_string(),
            name: name.to_string(),
            slug: None,
        })
    }

    async fn delete_organization(&self, _org_id: &str) -> Result<(), IdentityError> {
        Ok(())
    }

    async fn list_members(&self, _org_id: &str) -> Result<Vec<OrgMember>, IdentityError> {
        Ok(self.members.clone())
    }

    async fn add_member(
        &self,
        _org_id: &str,
        user_id: &str,
        role: OrgRole,
    ) -> Result<OrgMember, IdentityError> {
        Ok(OrgMember {
            user_id: user_id.to_string(),
            role,
        })
    }

    async fn update_member_role(
        &self,
        _org_id: &str,
        user_id: &str,
        role: OrgRole,
    ) -> Result<OrgMember, IdentityError> {
        Ok(OrgMember {
            user_id: user_id.to_string(),
            role,
        })
    }

    async fn remove_member(&self, _org_id: &str, _user_id: &str) -> Result<(), IdentityError> {
        Ok(())
    }

    async fn set_avatar_url(&self, _user_id: &str, _url: &str) -> Result<(), IdentityError> {
        Ok(())
    }
}

#[derive(Clone, Copy, PartialEq)]
enum GbpMode {
    Healthy,
    NoAccounts,
    AllForbidden,
}

struct FakeGbp {
    mode: GbpMode,
}

fn forbidden(endpoint: Endpoint) -> GbpError {
    GbpError::CallFailed {
        endpoint,
        status: 403,
        body: "PERMISSION_DENIED".to_string(),
    }
}

#[async_trait]
impl BusinessProfileApi for FakeGbp {
    async fn list_accounts(
        &self,
        _token: &str,
        _page_size: u32,
    ) -> Result<Vec<BusinessAccount>, GbpError> {
        match self.mode {
            GbpMode::NoAccounts => Ok(vec![]),
            GbpMode::AllForbidden => Err(forbidden(Endpoint::AccountManagement)),
            GbpMode::Healthy => Ok(vec![BusinessAccount {
                id: "accounts/1".to_string(),
                name: "Acme Coffee".to_string(),
                account_number: Some("1".to_string()),
                account_type: "PERSONAL".to_string(),
                role: "OWNER".to_string(),
                review_count: None,
                warning: None,
            }]),
        }
    }

    async fn list_locations(
        &self,
        _token: &str,
        _account: &str,
    ) -> Result<Vec<BusinessLocation>, GbpError> {
        match self.mode {
            GbpMode::AllForbidden => Err(forbidden(Endpoint::BusinessInformation)),
            _ => Ok(vec![BusinessLocation {
                resource_name: "locations/9".to_string(),
                title: "Acme Coffee Downtown".to_string(),
                address: Some("1 Main St".to_string()),
                phone: None,
                website: None,
                category: Some("Coffee shop".to_string()),
                hours: None,
            }]),
        }
    }

    async fn list_locations_fallback(
        &self,
        _token: &str,
        _account: &str,
    ) -> Result<Vec<BusinessLocation>, GbpError> {
        match self.mode {
            GbpMode::AllForbidden => Err(forbidden(Endpoint::AccountManagement)),
            _ => Ok(vec![]),
        }
    }

    async fn list_reviews(
        &self,
        _token: &str,
        _account: &str,
        _location: &str,
    ) -> Result<ReviewsPage, GbpError> {
        match self.mode {
            GbpMode::AllForbidden => Err(forbidden(Endpoint::LegacyMyBusiness)),
            _ => Ok(ReviewsPage {
                reviews: vec![],
                total_review_count: 5,
                average_rating: Some(4.8),
            }),
        }
    }

    async fn daily_metrics(
        &self,
        _token: &str,
        _location: &str,
    ) -> Result<Vec<DailyMetricSeries>, GbpError> {
        match self.mode {
            GbpMode::AllForbidden => Err(forbidden(Endpoint::Performance)),
            _ => Ok(vec![DailyMetricSeries {
                metric: "BUSINESS_IMPRESSIONS_DESKTOP_MAPS".to_string(),
                values: vec!["10".to_string(), "20".to_string(), "abc".to_string()],
            }]),
        }
    }

    async fn upsert_review_reply(
        &self,
        _token: &str,
        _account: &str,
        _location: &str,
        _review_id: &str,
        _comment: &str,
    ) -> Result<(), GbpError> {
        Ok(())
    }

    async fn delete_review_reply(
        &self,
        _token: &str,
        _account: &str,
        _location: &str,
        _review_id: &str,
    ) -> Result<(), GbpError> {
        Ok(())
    }
}

fn test_server(mode: GbpMode, upload_dir: Option<&str>) -> TestServer {
    let mut config = Config::default();
    if let Some(dir) = upload_dir {
        config.server.upload_dir = dir.to_string();
    }
    let state = AppState::with_providers(
        config,
        Arc::new(FakeIdentity::new()),
        Arc::new(FakeGbp { mode }),
    );
    TestServer::new(create_router(state)).unwrap()
}

fn authed(server: &TestServer, path: &str) -> axum_test::TestRequest {
    server
        .get(path)
        .add_header("authorization", format!("Bearer {SESSION_TOKEN}"))
}

// ---- tests ----

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let server = test_server(GbpMode::Healthy, None);

    let resp = server.get("/health").await;
    assert_eq!(resp.status_code(), 200);
    let body: serde_json::Value = resp.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn api_routes_require_a_session() {
    let server = test_server(GbpMode::Healthy, None);

    let resp = server.get("/api/business/overview").await;
    assert_eq!(resp.status_code(), 401);
    let body: serde_json::Value = resp.json();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn invalid_session_token_is_rejected() {
    let server = test_server(GbpMode::Healthy, None);

    let resp = server
        .get("/api/business/overview")
        .add_header("authorization", "Bearer sess_bogus")
        .await;
    assert_eq!(resp.status_code(), 401);
}

#[tokio::test]
async fn overview_attaches_review_count_to_the_account() {
    let server = test_server(GbpMode::Healthy, None);

    let resp = authed(&server, "/api/business/overview").await;
    assert_eq!(resp.status_code(), 200);
    let body: serde_json::Value = resp.json();

    assert_eq!(body["success"], true);
    assert_eq!(body["accounts"].as_array().unwrap().len(), 1);
    assert_eq!(body["accounts"][0]["reviewCount"], 5);
    assert_eq!(body["totalReviewCount"], 5);
    // 10 + 20 + ("abc" -> 0)
    assert_eq!(body["metrics"]["impressions"], 30);
}

#[tokio::test]
async fn overview_with_zero_accounts_is_empty_and_successful() {
    let server = test_server(GbpMode::NoAccounts, None);

    let resp = authed(&server, "/api/business/overview").await;
    assert_eq!(resp.status_code(), 200);
    let body: serde_json::Value = resp.json();

    assert_eq!(body["success"], true);
    assert_eq!(body["accounts"].as_array().unwrap().len(), 0);
    assert_eq!(body["locations"].as_array().unwrap().len(), 0);
    assert_eq!(body["reviews"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn diagnostics_roll_up_shared_403_into_verification_hint() {
    let server = test_server(GbpMode::AllForbidden, None);

    let resp = authed(&server, "/api/business/diagnostics").await;
    assert_eq!(resp.status_code(), 200);
    let body: serde_json::Value = resp.json();

    assert_eq!(body["overallSuccess"], false);
    let recommendations = body["recommendations"].as_array().unwrap();
    assert!(recommendations
        .iter()
        .any(|r| r.as_str().unwrap().contains("project verification issue")));
}

#[tokio::test]
async fn diagnostics_report_success_when_everything_answers() {
    let server = test_server(GbpMode::Healthy, None);

    let resp = authed(&server, "/api/business/diagnostics").await;
    assert_eq!(resp.status_code(), 200);
    let body: serde_json::Value = resp.json();

    assert_eq!(body["overallSuccess"], true);
    assert_eq!(body["recommendations"].as_array().unwrap().len(), 0);
    assert_eq!(body["results"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn demoting_the_last_admin_is_a_400() {
    let server = test_server(GbpMode::Healthy, None);

    let resp = server
        .patch(&format!("/api/organizations/org_1/members/{USER_ID}"))
        .add_header("authorization", format!("Bearer {SESSION_TOKEN}"))
        .json(&serde_json::json!({ "role": "basic_member" }))
        .await;

    assert_eq!(resp.status_code(), 400);
    let body: serde_json::Value = resp.json();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn removing_the_last_admin_is_a_400() {
    let server = test_server(GbpMode::Healthy, None);

    let resp = server
        .delete(&format!("/api/organizations/org_1/members/{USER_ID}"))
        .add_header("authorization", format!("Bearer {SESSION_TOKEN}"))
        .await;

    assert_eq!(resp.status_code(), 400);
}

#[tokio::test]
async fn organization_create_returns_the_new_org() {
    let server = test_server(GbpMode::Healthy, None);

    let resp = server
        .post("/api/organizations")
        .add_header("authorization", format!("Bearer {SESSION_TOKEN}"))
        .json(&serde_json::json!({ "name": "Acme" }))
        .await;

    assert_eq!(resp.status_code(), 200);
    let body: serde_json::Value = resp.json();
    assert_eq!(body["organization"]["name"], "Acme");
}

#[tokio::test]
async fn empty_review_reply_is_rejected() {
    let server = test_server(GbpMode::Healthy, None);

    let resp = server
        .put("/api/business/reviews/rev_1/reply")
        .add_header("authorization", format!("Bearer {SESSION_TOKEN}"))
        .json(&serde_json::json!({
            "account": "accounts/1",
            "location": "locations/9",
            "comment": "   "
        }))
        .await;

    assert_eq!(resp.status_code(), 400);
}

#[tokio::test]
async fn avatar_with_wrong_magic_is_rejected_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let server = test_server(GbpMode::Healthy, Some(dir.path().to_str().unwrap()));

    let resp = server
        .post("/api/users/avatar")
        .add_header("authorization", format!("Bearer {SESSION_TOKEN}"))
        .add_header("content-type", "image/png")
        .bytes(b"GIF89a definitely not a png".to_vec().into())
        .await;

    assert_eq!(resp.status_code(), 400);
    let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert!(entries.is_empty(), "nothing may be written on rejection");
}

#[tokio::test]
async fn valid_png_avatar_is_stored() {
    let dir = tempfile::tempdir().unwrap();
    let server = test_server(GbpMode::Healthy, Some(dir.path().to_str().unwrap()));

    let mut png = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    png.extend_from_slice(b"fake image data");

    let resp = server
        .post("/api/users/avatar")
        .add_header("authorization", format!("Bearer {SESSION_TOKEN}"))
        .add_header("content-type", "image/png")
        .bytes(png.into())
        .await;

    assert_eq!(resp.status_code(), 200);
    let body: serde_json::Value = resp.json();
    assert_eq!(body["avatarUrl"], format!("/uploads/{USER_ID}.png"));
    assert!(dir.path().join(format!("{USER_ID}.png")).exists());
}
