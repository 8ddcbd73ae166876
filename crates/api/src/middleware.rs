use axum::{
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use gymdesk_core::TenantId;

use crate::context::TenantContext;

/// Header carrying the active gym (tenant) id.
pub const TENANT_HEADER: &str = "x-tenant-id";

/// Resolve the tenant context from `X-Tenant-Id` or reject with 401.
///
/// Login and session handling live in front of this service; by the time a
/// request arrives the tenant has been established upstream.
pub async fn tenant_middleware(
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let tenant_id = extract_tenant(req.headers())?;

    req.extensions_mut().insert(TenantContext::new(tenant_id));

    Ok(next.run(req).await)
}

fn extract_tenant(headers: &HeaderMap) -> Result<TenantId, StatusCode> {
    let header = headers.get(TENANT_HEADER).ok_or(StatusCode::UNAUTHORIZED)?;

    let header = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;

    header.parse().map_err(|_| StatusCode::UNAUTHORIZED)
}
