use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::put,
    Json, Router,
};

use gymdesk_core::BranchId;

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::TenantContext;

pub fn router() -> Router {
    Router::new().route("/:id", put(upsert_branch))
}

pub async fn upsert_branch(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<BranchId>,
    Json(body): Json<dto::UpsertBranchRequest>,
) -> axum::response::Response {
    let branch = match body.into_branch(tenant.tenant_id(), id) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    match services.directory.upsert_branch(tenant.tenant_id(), branch.clone()).await {
        Ok(()) => (StatusCode::OK, Json(branch)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
