use bizdash_core::{BusinessAccount, BusinessLocation, PerformanceMetrics, Review};
use futures::future::join_all;
use serde::Serialize;
use tracing::warn;

use crate::client::BusinessProfileApi;
use crate::error::Result;
use crate::metrics::reduce_daily_metrics;

pub const NO_LOCATIONS_WARNING: &str = "no locations found for this account";

/// Per-stage errors, attached to the result instead of thrown. A populated
/// field means that stage failed; everything downstream of it is simply
/// absent.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accounts: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locations: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviews: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<String>,
}

impl AggregateErrors {
    pub fn is_empty(&self) -> bool {
        self.accounts.is_none()
            && self.locations.is_none()
            && self.reviews.is_none()
            && self.metrics.is_none()
    }
}

/// Combined dashboard payload for the first-account flow. Always a complete
/// value: partial upstream failures land in `errors`/`warnings`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResult {
    pub accounts: Vec<BusinessAccount>,
    pub locations: Vec<BusinessLocation>,
    pub reviews: Vec<Review>,
    pub total_review_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<PerformanceMetrics>,
    pub errors: AggregateErrors,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountWithLocations {
    #[serde(flatten)]
    pub account: BusinessAccount,
    pub locations: Vec<BusinessLocation>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountsOverview {
    pub accounts: Vec<AccountWithLocations>,
    pub errors: AggregateErrors,
}

/// Locations for one account: primary Business Information endpoint first,
/// then one attempt against the Account-Management-scoped endpoint. A
/// different endpoint, not a retry of the same one.
pub async fn locations_with_fallback(
    api: &dyn BusinessProfileApi,
    token: &str,
    account: &str,
) -> Result<Vec<BusinessLocation>> {
    match api.list_locations(token, account).await {
        Ok(locations) => Ok(locations),
        Err(primary) => {
            warn!(%account, error = %primary, "primary locations endpoint failed, trying fallback");
            api.list_locations_fallback(token, account).await
        }
    }
}

/// The ordered, fail-soft read pipeline: accounts, then locations for the
/// first account, then reviews and performance metrics for the first
/// location (issued concurrently and independently).
pub async fn aggregate_first_account(
    api: &dyn BusinessProfileApi,
    token: &str,
    page_size: u32,
) -> AggregateResult {
    let mut result = AggregateResult::default();

    let mut accounts = match api.list_accounts(token, page_size).await {
        Ok(accounts) => accounts,
        Err(e) => {
            warn!(error = %e, "account listing failed");
            result.errors.accounts = Some(e.to_string());
            return result;
        }
    };

    // Zero accounts is a valid empty terminal state, not an error; nothing
    // downstream is called.
    if accounts.is_empty() {
        return result;
    }

    let account_id = accounts[0].id.clone();
    let locations = match locations_with_fallback(api, token, &account_id).await {
        Ok(locations) => locations,
        Err(e) => {
            result.errors.locations = Some(e.to_string());
            accounts[0].warning = Some(format!("locations unavailable: {e}"));
            result.accounts = accounts;
            return result;
        }
    };

    if locations.is_empty() {
        accounts[0].warning = Some(NO_LOCATIONS_WARNING.to_string());
        result.warnings.push(NO_LOCATIONS_WARNING.to_string());
        result.accounts = accounts;
        return result;
    }

    let location_id = locations[0].resource_name.clone();

    // Independent of each other: one failing must not block or invalidate
    // the other.
    let (reviews_outcome, metrics_outcome) = tokio::join!(
        api.list_reviews(token, &account_id, &location_id),
        api.daily_metrics(token, &location_id),
    );

    match reviews_outcome {
        Ok(page) => {
            accounts[0].review_count = Some(page.total_review_count);
            result.total_review_count = page.total_review_count;
            result.average_rating = page.average_rating;
            result.reviews = page.reviews;
        }
        Err(e) => {
            warn!(error = %e, "reviews fetch failed");
            result.errors.reviews = Some(e.to_string());
        }
    }

    match metrics_outcome {
        Ok(series) => result.metrics = Some(reduce_daily_metrics(&series)),
        Err(e) => {
            warn!(error = %e, "performance metrics fetch failed");
            result.errors.metrics = Some(e.to_string());
        }
    }

    result.accounts = accounts;
    result.locations = locations;
    result
}

/// The "list all accounts" variant: every account's locations are fetched
/// concurrently with no concurrency cap (account counts are tens, not
/// thousands).
pub async fn aggregate_all_accounts(
    api: &dyn BusinessProfileApi,
    token: &str,
    page_size: u32,
) -> AccountsOverview {
    let mut overview = AccountsOverview::default();

    let accounts = match api.list_accounts(token, page_size).await {
        Ok(accounts) => accounts,
        Err(e) => {
            warn!(error = %e, "account listing failed");
            overview.errors.accounts = Some(e.to_string());
            return overview;
        }
    };

    let fetches = accounts.iter().map(|account| {
        let account_id = account.id.clone();
        async move { locations_with_fallback(api, token, &account_id).await }
    });
    let outcomes: Vec<Result<Vec<BusinessLocation>>> = join_all(fetches).await;

    overview.accounts = accounts
        .into_iter()
        .zip(outcomes)
        .map(|(mut account, outcome)| {
            let locations = match outcome {
                Ok(locations) => {
                    if locations.is_empty() {
                        account.warning = Some(NO_LOCATIONS_WARNING.to_string());
                    }
                    locations
                }
                Err(e) => {
                    account.warning = Some(format!("locations unavailable: {e}"));
                    Vec::new()
                }
            };
            AccountWithLocations { account, locations }
        })
        .collect();

    overview
}
