use std::time::Duration;

use async_trait::async_trait;
use bizdash_core::{BusinessAccount, BusinessLocation, Endpoint, GbpConfig, Review};
use chrono::{Datelike, Duration as ChronoDuration, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::error::{GbpError, Result};

/// Daily metric names requested from the Performance API for the dashboard's
/// 30-day window.
const DAILY_METRICS: &[&str] = &[
    "BUSINESS_IMPRESSIONS_DESKTOP_MAPS",
    "BUSINESS_IMPRESSIONS_DESKTOP_SEARCH",
    "BUSINESS_IMPRESSIONS_MOBILE_MAPS",
    "BUSINESS_IMPRESSIONS_MOBILE_SEARCH",
    "BUSINESS_CONVERSATIONS",
    "BUSINESS_DIRECTION_REQUESTS",
    "BUSINESS_BOOKINGS",
    "WEBSITE_CLICKS",
    "CALL_CLICKS",
];

const LOCATION_READ_MASK: &str =
    "name,title,storefrontAddress,phoneNumbers,websiteUri,categories,regularHours";

/// One reviews page as returned by the legacy API. `total_review_count` is
/// the upstream total, not the page length.
#[derive(Debug, Clone, Default)]
pub struct ReviewsPage {
    pub reviews: Vec<Review>,
    pub total_review_count: u64,
    pub average_rating: Option<f64>,
}

/// A named daily time series, values as the upstream returns them (strings).
#[derive(Debug, Clone)]
pub struct DailyMetricSeries {
    pub metric: String,
    pub values: Vec<String>,
}

/// Seam over the Business Profile REST surface. The aggregator and the
/// diagnostics probe run against this trait; `GbpClient` is the wire
/// implementation.
#[async_trait]
pub trait BusinessProfileApi: Send + Sync {
    async fn list_accounts(&self, token: &str, page_size: u32) -> Result<Vec<BusinessAccount>>;

    /// Locations via the Business Information API (the primary endpoint).
    async fn list_locations(&self, token: &str, account: &str) -> Result<Vec<BusinessLocation>>;

    /// Locations via the Account-Management-scoped endpoint, used as the
    /// one-shot fallback when the primary endpoint fails.
    async fn list_locations_fallback(
        &self,
        token: &str,
        account: &str,
    ) -> Result<Vec<BusinessLocation>>;

    async fn list_reviews(&self, token: &str, account: &str, location: &str)
        -> Result<ReviewsPage>;

    async fn daily_metrics(&self, token: &str, location: &str) -> Result<Vec<DailyMetricSeries>>;

    async fn upsert_review_reply(
        &self,
        token: &str,
        account: &str,
        location: &str,
        review_id: &str,
        comment: &str,
    ) -> Result<()>;

    async fn delete_review_reply(
        &self,
        token: &str,
        account: &str,
        location: &str,
        review_id: &str,
    ) -> Result<()>;
}

// ---- wire DTOs ----

#[derive(Debug, Deserialize)]
struct AccountsResponse {
    #[serde(default)]
    accounts: Vec<WireAccount>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireAccount {
    name: String,
    #[serde(default)]
    account_name: Option<String>,
    #[serde(default)]
    account_number: Option<String>,
    #[serde(default, rename = "type")]
    account_type: Option<String>,
    #[serde(default)]
    role: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LocationsResponse {
    #[serde(default)]
    locations: Vec<WireLocation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireLocation {
    name: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    storefront_address: Option<WireAddress>,
    #[serde(default)]
    phone_numbers: Option<WirePhones>,
    #[serde(default)]
    website_uri: Option<String>,
    #[serde(default)]
    categories: Option<WireCategories>,
    #[serde(default)]
    regular_hours: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireAddress {
    #[serde(default)]
    address_lines: Vec<String>,
    #[serde(default)]
    locality: Option<String>,
    #[serde(default)]
    administrative_area: Option<String>,
    #[serde(default)]
    postal_code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePhones {
    #[serde(default)]
    primary_phone: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireCategories {
    #[serde(default)]
    primary_category: Option<WireCategory>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireCategory {
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReviewsResponse {
    #[serde(default)]
    reviews: Vec<WireReview>,
    #[serde(default)]
    total_review_count: u64,
    #[serde(default)]
    average_rating: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireReview {
    review_id: String,
    #[serde(default)]
    star_rating: Option<String>,
    #[serde(default)]
    comment: Option<String>,
    #[serde(default)]
    create_time: Option<String>,
    #[serde(default)]
    review_reply: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MultiDailyMetricsResponse {
    #[serde(default)]
    multi_daily_metric_time_series: Vec<WireMultiSeries>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireMultiSeries {
    #[serde(default)]
    daily_metric_time_series: Vec<WireDailySeries>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireDailySeries {
    #[serde(default)]
    daily_metric: String,
    #[serde(default)]
    time_series: Option<WireTimeSeries>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTimeSeries {
    #[serde(default)]
    dated_values: Vec<WireDatedValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireDatedValue {
    #[serde(default)]
    value: Option<String>,
}

// ---- client ----

pub struct GbpClient {
    config: GbpConfig,
    client: Client,
}

impl GbpClient {
    pub fn new(config: GbpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GbpError::Transport {
                endpoint: Endpoint::AccountManagement,
                message: e.to_string(),
            })?;
        Ok(Self { config, client })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        url: String,
        token: &str,
    ) -> Result<T> {
        debug!(endpoint = endpoint.display_name(), %url, "GET");
        let resp = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| GbpError::Transport {
                endpoint,
                message: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GbpError::CallFailed {
                endpoint,
                status: status.as_u16(),
                body,
            });
        }

        resp.json().await.map_err(|e| GbpError::MalformedResponse {
            endpoint,
            message: e.to_string(),
        })
    }

    fn convert_location(loc: WireLocation) -> BusinessLocation {
        let address = loc.storefront_address.map(|a| {
            let mut parts = a.address_lines;
            parts.extend(a.locality);
            parts.extend(a.administrative_area);
            parts.extend(a.postal_code);
            parts.join(", ")
        });

        BusinessLocation {
            resource_name: loc.name,
            title: loc.title.unwrap_or_default(),
            address,
            phone: loc.phone_numbers.and_then(|p| p.primary_phone),
            website: loc.website_uri,
            category: loc
                .categories
                .and_then(|c| c.primary_category)
                .and_then(|c| c.display_name),
            hours: loc.regular_hours,
        }
    }
}

#[async_trait]
impl BusinessProfileApi for GbpClient {
    async fn list_accounts(&self, token: &str, page_size: u32) -> Result<Vec<BusinessAccount>> {
        let url = format!(
            "{}/accounts?pageSize={page_size}",
            self.config.account_mgmt_base
        );
        let resp: AccountsResponse = self
            .get_json(Endpoint::AccountManagement, url, token)
            .await?;

        Ok(resp
            .accounts
            .into_iter()
            .map(|a| BusinessAccount {
                name: a.account_name.unwrap_or_else(|| a.name.clone()),
                id: a.name,
                account_number: a.account_number,
                account_type: a.account_type.unwrap_or_else(|| "PERSONAL".into()),
                role: a.role.unwrap_or_else(|| "OWNER".into()),
                review_count: None,
                warning: None,
            })
            .collect())
    }

    async fn list_locations(&self, token: &str, account: &str) -> Result<Vec<BusinessLocation>> {
        let url = format!(
            "{}/{account}/locations?readMask={LOCATION_READ_MASK}&pageSize=100",
            self.config.business_info_base
        );
        let resp: LocationsResponse = self
            .get_json(Endpoint::BusinessInformation, url, token)
            .await?;
        Ok(resp
            .locations
            .into_iter()
            .map(Self::convert_location)
            .collect())
    }

    async fn list_locations_fallback(
        &self,
        token: &str,
        account: &str,
    ) -> Result<Vec<BusinessLocation>> {
        let url = format!(
            "{}/{account}/locations?pageSize=100",
            self.config.account_mgmt_base
        );
        let resp: LocationsResponse = self
            .get_json(Endpoint::AccountManagement, url, token)
            .await?;
        Ok(resp
            .locations
            .into_iter()
            .map(Self::convert_location)
            .collect())
    }

    async fn list_reviews(
        &self,
        token: &str,
        account: &str,
        location: &str,
    ) -> Result<ReviewsPage> {
        let url = format!("{}/{account}/{location}/reviews", self.config.legacy_base);
        let resp: ReviewsResponse = self.get_json(Endpoint::LegacyMyBusiness, url, token).await?;

        Ok(ReviewsPage {
            reviews: resp
                .reviews
                .into_iter()
                .map(|r| Review {
                    id: r.review_id,
                    star_rating: r.star_rating.unwrap_or_else(|| "STAR_RATING_UNSPECIFIED".into()),
                    comment: r.comment,
                    create_time: r.create_time.unwrap_or_default(),
                    has_reply: r.review_reply.is_some(),
                })
                .collect(),
            total_review_count: resp.total_review_count,
            average_rating: resp.average_rating,
        })
    }

    async fn daily_metrics(&self, token: &str, location: &str) -> Result<Vec<DailyMetricSeries>> {
        let end = Utc::now().date_naive();
        let start = end - ChronoDuration::days(30);

        let mut url = format!(
            "{}/{location}:fetchMultiDailyMetricsTimeSeries?\
             dailyRange.start_date.year={}&dailyRange.start_date.month={}&dailyRange.start_date.day={}&\
             dailyRange.end_date.year={}&dailyRange.end_date.month={}&dailyRange.end_date.day={}",
            self.config.performance_base,
            start.year(),
            start.month(),
            start.day(),
            end.year(),
            end.month(),
            end.day(),
        );
        for metric in DAILY_METRICS {
            url.push_str("&dailyMetrics=");
            url.push_str(metric);
        }

        let resp: MultiDailyMetricsResponse =
            self.get_json(Endpoint::Performance, url, token).await?;

        Ok(resp
            .multi_daily_metric_time_series
            .into_iter()
            .flat_map(|m| m.daily_metric_time_series)
            .map(|series| DailyMetricSeries {
                metric: series.daily_metric,
                values: series
                    .time_series
                    .map(|ts| ts.dated_values.into_iter().filter_map(|v| v.value).collect())
                    .unwrap_or_default(),
            })
            .collect())
    }

    async fn upsert_review_reply(
        &self,
        token: &str,
        account: &str,
        location: &str,
        review_id: &str,
        comment: &str,
    ) -> Result<()> {
        let url = format!(
            "{}/{account}/{location}/reviews/{review_id}/reply",
            self.config.legacy_base
        );
        let resp = self
            .client
            .put(&url)
            .bearer_auth(token)
            .json(&json!({ "comment": comment }))
            .send()
            .await
            .map_err(|e| GbpError::Transport {
                endpoint: Endpoint::LegacyMyBusiness,
                message: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GbpError::CallFailed {
                endpoint: Endpoint::LegacyMyBusiness,
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    async fn delete_review_reply(
        &self,
        token: &str,
        account: &str,
        location: &str,
        review_id: &str,
    ) -> Result<()> {
        let url = format!(
            "{}/{account}/{location}/reviews/{review_id}/reply",
            self.config.legacy_base
        );
        let resp = self
            .client
            .delete(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| GbpError::Transport {
                endpoint: Endpoint::LegacyMyBusiness,
                message: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GbpError::CallFailed {
                endpoint: Endpoint::LegacyMyBusiness,
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}
