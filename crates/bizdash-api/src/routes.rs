use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{handlers, org_handlers, session::session_middleware, upload, AppState};

pub fn create_router(state: AppState) -> Router {
    // Everything under /api requires a resolved session.
    let api = Router::new()
        // Business Profile read pipeline
        .route("/business/overview", get(handlers::business_overview))
        .route("/business/accounts", get(handlers::business_accounts))
        .route("/business/locations", get(handlers::business_locations))
        .route("/business/reviews", get(handlers::business_reviews))
        .route(
            "/business/reviews/{review_id}/reply",
            put(handlers::upsert_review_reply).delete(handlers::delete_review_reply),
        )
        .route("/business/metrics", get(handlers::business_metrics))
        .route("/business/diagnostics", get(handlers::business_diagnostics))
        // Organization management
        .route("/organizations", post(org_handlers::create_organization))
        .route(
            "/organizations/{org_id}",
            get(org_handlers::get_organization)
                .patch(org_handlers::update_organization)
                .delete(org_handlers::delete_organization),
        )
        .route(
            "/organizations/{org_id}/members",
            get(org_handlers::list_members).post(org_handlers::add_member),
        )
        .route(
            "/organizations/{org_id}/members/{member_id}",
            delete(org_handlers::remove_member).patch(org_handlers::update_member),
        )
        // Uploads
        .route("/users/avatar", post(upload::upload_avatar))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", api)
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .layer(TraceLayer::new_for_http())
}
