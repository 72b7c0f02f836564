use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use bizdash_core::{
    BusinessLocation, DiagnosticReport, PerformanceMetrics, Review, Session,
};
use bizdash_gbp::{
    aggregate_all_accounts, aggregate_first_account, locations_with_fallback,
    reduce_daily_metrics, run_diagnostics, AccountsOverview, AggregateResult,
};
use bizdash_identity::resolve_google_token;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: option_env!("CARGO_PKG_VERSION")
            .unwrap_or("0.1.0")
            .to_string(),
    })
}

/// Token Resolver step shared by every Business Profile handler: the
/// session's user is exchanged for a Google-scoped bearer token.
async fn google_token(state: &AppState, session: &Session) -> ApiResult<String> {
    Ok(resolve_google_token(state.identity.as_ref(), &session.user_id).await?)
}

// ---- read pipeline ----

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewResponse {
    pub success: bool,
    #[serde(flatten)]
    pub result: AggregateResult,
}

/// First-account dashboard flow: accounts → locations (with fallback) →
/// reviews + metrics. Partial upstream failures come back inside the
/// envelope, not as an error status.
pub async fn business_overview(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<Json<OverviewResponse>> {
    let token = google_token(&state, &session).await?;
    let result =
        aggregate_first_account(state.gbp.as_ref(), &token, state.config.gbp.accounts_page_size)
            .await;
    Ok(Json(OverviewResponse {
        success: true,
        result,
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountsResponse {
    pub success: bool,
    #[serde(flatten)]
    pub overview: AccountsOverview,
}

pub async fn business_accounts(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<Json<AccountsResponse>> {
    let token = google_token(&state, &session).await?;
    let overview =
        aggregate_all_accounts(state.gbp.as_ref(), &token, state.config.gbp.accounts_page_size)
            .await;
    Ok(Json(AccountsResponse {
        success: true,
        overview,
    }))
}

#[derive(Deserialize)]
pub struct LocationsQuery {
    pub account: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationsResponse {
    pub success: bool,
    pub locations: Vec<BusinessLocation>,
}

pub async fn business_locations(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(params): Query<LocationsQuery>,
) -> ApiResult<Json<LocationsResponse>> {
    let token = google_token(&state, &session).await?;
    let locations = locations_with_fallback(state.gbp.as_ref(), &token, &params.account).await?;
    Ok(Json(LocationsResponse {
        success: true,
        locations,
    }))
}

#[derive(Deserialize)]
pub struct ReviewsQuery {
    pub account: String,
    pub location: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewsResponse {
    pub success: bool,
    pub reviews: Vec<Review>,
    pub total_review_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
}

pub async fn business_reviews(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(params): Query<ReviewsQuery>,
) -> ApiResult<Json<ReviewsResponse>> {
    let token = google_token(&state, &session).await?;
    let page = state
        .gbp
        .list_reviews(&token, &params.account, &params.location)
        .await?;
    Ok(Json(ReviewsResponse {
        success: true,
        reviews: page.reviews,
        total_review_count: page.total_review_count,
        average_rating: page.average_rating,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyRequest {
    pub account: String,
    pub location: String,
    pub comment: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

pub async fn upsert_review_reply(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(review_id): Path<String>,
    Json(request): Json<ReplyRequest>,
) -> ApiResult<Json<MessageResponse>> {
    if request.comment.trim().is_empty() {
        return Err(ApiError::BadRequest("reply comment must not be empty".into()));
    }

    let token = google_token(&state, &session).await?;
    state
        .gbp
        .upsert_review_reply(
            &token,
            &request.account,
            &request.location,
            &review_id,
            &request.comment,
        )
        .await?;
    Ok(Json(MessageResponse {
        success: true,
        message: format!("reply saved for review {review_id}"),
    }))
}

#[derive(Deserialize)]
pub struct ReplyTargetQuery {
    pub account: String,
    pub location: String,
}

pub async fn delete_review_reply(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(review_id): Path<String>,
    Query(params): Query<ReplyTargetQuery>,
) -> ApiResult<Json<MessageResponse>> {
    let token = google_token(&state, &session).await?;
    state
        .gbp
        .delete_review_reply(&token, &params.account, &params.location, &review_id)
        .await?;
    Ok(Json(MessageResponse {
        success: true,
        message: format!("reply deleted for review {review_id}"),
    }))
}

#[derive(Deserialize)]
pub struct MetricsQuery {
    pub location: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsResponse {
    pub success: bool,
    pub metrics: PerformanceMetrics,
}

pub async fn business_metrics(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(params): Query<MetricsQuery>,
) -> ApiResult<Json<MetricsResponse>> {
    let token = google_token(&state, &session).await?;
    let series = state.gbp.daily_metrics(&token, &params.location).await?;
    Ok(Json(MetricsResponse {
        success: true,
        metrics: reduce_daily_metrics(&series),
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsResponse {
    pub success: bool,
    #[serde(flatten)]
    pub report: DiagnosticReport,
}

/// Probe every upstream surface once and classify the outcomes. Always a
/// 200 envelope for an authenticated caller; failures are described, not
/// propagated.
pub async fn business_diagnostics(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<Json<DiagnosticsResponse>> {
    let token = google_token(&state, &session).await?;
    let report = run_diagnostics(state.gbp.as_ref(), &token).await;
    Ok(Json(DiagnosticsResponse {
        success: true,
        report,
    }))
}
