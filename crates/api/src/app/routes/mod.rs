use axum::Router;

pub mod branches;
pub mod members;
pub mod payments;
pub mod system;

/// Router for all tenant-scoped endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/payments", payments::router())
        .nest("/members", members::router())
        .nest("/branches", branches::router())
}
