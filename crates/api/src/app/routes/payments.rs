use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, patch, post},
    Json, Router,
};

use gymdesk_billing::PaymentStatus;
use gymdesk_core::PaymentId;
use gymdesk_receipts::{receipt_html, whatsapp_link, whatsapp_text, Receipt};

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::TenantContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(record_payment))
        .route("/:id/status", patch(update_status))
        .route("/:id/receipt", get(receipt_json))
        .route("/:id/receipt.html", get(receipt_page))
        .route("/:id/receipt/whatsapp", get(receipt_whatsapp))
}

pub async fn record_payment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Json(body): Json<dto::RecordPaymentRequest>,
) -> axum::response::Response {
    let record = match body.into_record(tenant.tenant_id()) {
        Ok(record) => record,
        Err(response) => return response,
    };

    match services.payments.record(tenant.tenant_id(), record).await {
        Ok(saved) => {
            tracing::info!(
                tenant_id = %tenant.tenant_id(),
                payment_id = %saved.id,
                member_id = %saved.member_id,
                "payment recorded"
            );
            (StatusCode::CREATED, Json(saved)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<PaymentId>,
    Json(body): Json<dto::UpdateStatusRequest>,
) -> axum::response::Response {
    let status: PaymentStatus = match body.status.parse() {
        Ok(s) => s,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.payments.update_status(tenant.tenant_id(), id, status).await {
        Ok(updated) => (StatusCode::OK, Json(updated)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

async fn load_receipt(
    services: &AppServices,
    tenant: TenantContext,
    id: PaymentId,
) -> Result<Receipt, axum::response::Response> {
    match services.receipt(tenant.tenant_id(), id).await {
        Ok(Some(r)) => Ok(r),
        Ok(None) => Err(errors::not_found("payment")),
        Err(e) => Err(errors::store_error_to_response(e)),
    }
}

pub async fn receipt_json(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<PaymentId>,
) -> axum::response::Response {
    match load_receipt(&services, tenant, id).await {
        Ok(r) => (StatusCode::OK, Json(r)).into_response(),
        Err(resp) => resp,
    }
}

pub async fn receipt_page(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<PaymentId>,
) -> axum::response::Response {
    match load_receipt(&services, tenant, id).await {
        Ok(r) => Html(receipt_html(&r)).into_response(),
        Err(resp) => resp,
    }
}

pub async fn receipt_whatsapp(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<PaymentId>,
) -> axum::response::Response {
    let receipt = match load_receipt(&services, tenant, id).await {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    let text = whatsapp_text(&receipt);
    let link = receipt
        .member_phone
        .as_deref()
        .and_then(|phone| whatsapp_link(phone, &services.default_country_code, &text));

    (StatusCode::OK, Json(serde_json::json!({ "text": text, "link": link }))).into_response()
}
