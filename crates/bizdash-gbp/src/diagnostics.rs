use bizdash_core::{DiagnosticReport, DiagnosticResult, Endpoint};
use tracing::warn;

use crate::client::BusinessProfileApi;
use crate::error::GbpError;

/// Map one endpoint response to a result with remediation hints. Pure
/// function: no state, no memory across calls.
pub fn classify(endpoint: Endpoint, status_code: u16, error_message: Option<String>) -> DiagnosticResult {
    let success = (200..=299).contains(&status_code);
    let recommendations = if success {
        Vec::new()
    } else {
        recommendations_for(endpoint, status_code)
    };

    DiagnosticResult {
        endpoint,
        endpoint_name: endpoint.display_name().to_string(),
        success,
        status_code,
        error_message: if success { None } else { error_message },
        recommendations,
    }
}

fn recommendations_for(endpoint: Endpoint, status_code: u16) -> Vec<String> {
    let mut hints: Vec<String> = match status_code {
        400 => vec![
            "Check the request format and parameters".into(),
            format!(
                "Ensure the {} is enabled in your Google Cloud project",
                endpoint.display_name()
            ),
        ],
        401 => vec![
            "OAuth token is invalid or expired - reconnect the Google account".into(),
            "Verify the OAuth scope includes https://www.googleapis.com/auth/business.manage".into(),
        ],
        403 => {
            let mut h = vec![
                "The connected Google account lacks permission for this resource".into(),
                format!(
                    "Verify the {} is enabled in your Google Cloud project",
                    endpoint.display_name()
                ),
                "Check that the API quota is not set to zero".into(),
            ];
            if endpoint.is_legacy() {
                h.push(
                    "The legacy My Business API ships with zero quota - submit a quota increase request".into(),
                );
                h.push(
                    "Complete the Business Profile APIs verification process for your project".into(),
                );
            }
            h
        }
        404 => vec![
            "Resource not found - the endpoint path may have changed or the resource was deleted".into(),
        ],
        429 => vec!["API quota exceeded - request higher limits in the Google Cloud console".into()],
        500..=599 => vec![
            "Transient Google-side error - check the Google Workspace status dashboard and retry later".into(),
        ],
        _ => vec![format!(
            "Unexpected status {status_code} from the {} - inspect the response body",
            endpoint.display_name()
        )],
    };
    hints.dedup();
    hints
}

/// Roll per-endpoint results into one report. Recommendations are
/// deduplicated in first-seen order; when every failing endpoint shares a
/// single status code, one cross-endpoint hint is appended.
pub fn summarize(results: Vec<DiagnosticResult>) -> DiagnosticReport {
    let overall_success = results.iter().all(|r| r.success);

    let mut recommendations: Vec<String> = Vec::new();
    for result in &results {
        for hint in &result.recommendations {
            if !recommendations.contains(hint) {
                recommendations.push(hint.clone());
            }
        }
    }

    let failing: Vec<&DiagnosticResult> = results.iter().filter(|r| !r.success).collect();
    if let Some(first) = failing.first() {
        let shared = first.status_code;
        if failing.iter().all(|r| r.status_code == shared) {
            recommendations.push(cross_endpoint_hint(shared));
        }
    }

    DiagnosticReport {
        overall_success,
        results,
        recommendations,
    }
}

fn cross_endpoint_hint(status_code: u16) -> String {
    match status_code {
        401 => "All endpoints are failing with 401 - reconnect the Google account".into(),
        403 => {
            "All endpoints are failing with 403 - this usually indicates a project verification issue"
                .into()
        }
        _ => format!("All endpoints are failing with {status_code} - check project configuration"),
    }
}

/// Probe every Business Profile surface once and classify each outcome.
/// Never fails: an unreachable accounts endpoint just leaves the dependent
/// probes running against a placeholder resource, which classifies like any
/// other failure.
pub async fn run_diagnostics(api: &dyn BusinessProfileApi, token: &str) -> DiagnosticReport {
    let mut results = Vec::with_capacity(4);

    let (account, location) = match api.list_accounts(token, 10).await {
        Ok(accounts) => {
            results.push(classify(Endpoint::AccountManagement, 200, None));
            let account = accounts
                .first()
                .map(|a| a.id.clone())
                .unwrap_or_else(|| "accounts/0".to_string());

            let location = match api.list_locations(token, &account).await {
                Ok(locations) => {
                    results.push(classify(Endpoint::BusinessInformation, 200, None));
                    locations
                        .first()
                        .map(|l| l.resource_name.clone())
                        .unwrap_or_else(|| "locations/0".to_string())
                }
                Err(e) => {
                    results.push(classify_error(&e));
                    "locations/0".to_string()
                }
            };
            (account, location)
        }
        Err(e) => {
            warn!(error = %e, "accounts probe failed");
            results.push(classify_error(&e));
            results.push(classify(
                Endpoint::BusinessInformation,
                e.status(),
                Some("Skipped: account listing failed".into()),
            ));
            ("accounts/0".to_string(), "locations/0".to_string())
        }
    };

    match api.list_reviews(token, &account, &location).await {
        Ok(_) => results.push(classify(Endpoint::LegacyMyBusiness, 200, None)),
        Err(e) => results.push(classify_error(&e)),
    }

    match api.daily_metrics(token, &location).await {
        Ok(_) => results.push(classify(Endpoint::Performance, 200, None)),
        Err(e) => results.push(classify_error(&e)),
    }

    summarize(results)
}

pub fn classify_error(error: &GbpError) -> DiagnosticResult {
    classify(error.endpoint(), error.status(), Some(error.to_string()))
}
