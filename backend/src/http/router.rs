//! Router configuration for the HTTP API.
//!
//! Sets up all routes and middleware (CORS, compression, tracing).

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // Permissive CORS for the browser frontend
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Catalog
        .route("/courses", get(handlers::list_courses))
        .route("/courses/search", get(handlers::search_courses))
        .route(
            "/courses/{course_id}/prerequisites",
            get(handlers::get_prerequisites),
        )
        .route(
            "/courses/{course_id}/prerequisite-graph",
            get(handlers::get_prerequisite_graph),
        )
        .route("/majors", get(handlers::list_majors))
        .route("/ap-courses", get(handlers::list_ap_courses))
        .route("/ap-courses/mapping", get(handlers::get_ap_course_mapping))
        // Students
        .route(
            "/students",
            get(handlers::list_students).post(handlers::create_student),
        )
        .route(
            "/students/{net_id}",
            get(handlers::get_student).put(handlers::update_student),
        )
        .route("/students/{net_id}/plans", get(handlers::list_student_plans))
        .route(
            "/students/{net_id}/requirements",
            get(handlers::get_fulfilled_requirements),
        )
        .route(
            "/students/{net_id}/total-credits",
            get(handlers::get_total_credits),
        )
        // Plans
        .route("/plans", post(handlers::create_plan))
        .route(
            "/plans/{plan_id}",
            get(handlers::get_plan).delete(handlers::delete_plan),
        )
        .route("/plans/{plan_id}/courses", post(handlers::add_course))
        .route(
            "/plans/{plan_id}/courses/{course_id}",
            delete(handlers::remove_course),
        )
        .route(
            "/plans/{plan_id}/semesters",
            get(handlers::get_semester_breakdown),
        )
        .route(
            "/plans/{plan_id}/semesters/{semester}/credits",
            get(handlers::get_semester_credits),
        )
        .route("/plans/{plan_id}/bypass-log", get(handlers::get_bypass_log));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::db::repositories::LocalRepository;
    use crate::db::repository::FullRepository;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn router() -> Router {
        let repo = Arc::new(LocalRepository::new()) as Arc<dyn FullRepository>;
        create_router(AppState::new(repo, AppConfig::default()))
    }

    #[tokio::test]
    async fn test_health_route() {
        let response = router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let response = router()
            .oneshot(Request::get("/v1/nothing").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_non_numeric_plan_id_is_rejected() {
        let response = router()
            .oneshot(Request::get("/v1/plans/abc").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
