use serde::{Deserialize, Serialize};

/// Authenticated caller, resolved from the identity provider once per
/// request. Read-only to this system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessAccount {
    /// Resource name, e.g. `accounts/1234567890`.
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
    #[serde(rename = "type")]
    pub account_type: String,
    pub role: String,
    /// Reviews found for this account's first location, when the read path
    /// got that far.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_count: Option<u64>,
    /// Attached instead of failing when an account has no locations or its
    /// location fetch failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessLocation {
    /// Resource name, e.g. `locations/987654321`.
    pub resource_name: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub star_rating: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub create_time: String,
    pub has_reply: bool,
}

/// Sums over a fixed 30-day window, reduced from the daily series the
/// Performance API returns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub impressions: u64,
    pub searches: u64,
    pub conversations: u64,
    pub direction_requests: u64,
    pub bookings: u64,
    pub website_clicks: u64,
    pub phone_calls: u64,
}

/// The upstream surfaces this system calls. The legacy v4 API gets extra
/// remediation hints on 403 because its quota defaults to zero until a
/// quota-increase request is approved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Endpoint {
    AccountManagement,
    BusinessInformation,
    LegacyMyBusiness,
    Performance,
}

impl Endpoint {
    pub fn display_name(&self) -> &'static str {
        match self {
            Endpoint::AccountManagement => "Account Management API",
            Endpoint::BusinessInformation => "Business Information API",
            Endpoint::LegacyMyBusiness => "My Business API (legacy v4)",
            Endpoint::Performance => "Business Profile Performance API",
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, Endpoint::LegacyMyBusiness)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticResult {
    pub endpoint: Endpoint,
    pub endpoint_name: String,
    pub success: bool,
    pub status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticReport {
    pub overall_success: bool,
    pub results: Vec<DiagnosticResult>,
    pub recommendations: Vec<String>,
}
