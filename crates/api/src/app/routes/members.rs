use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};

use gymdesk_billing::{balance_as_of, payment_balances, running_balance, MemberLedger, PaymentRecord};
use gymdesk_core::MemberId;
use gymdesk_infra::TimeWindow;
use gymdesk_receipts::{ledger_csv, payments_csv};

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::TenantContext;

pub fn router() -> Router {
    Router::new()
        .route("/:id", put(upsert_member))
        .route("/:id/ledger", get(member_ledger))
        .route("/:id/balance", get(member_balance))
        .route("/:id/running-balance", get(member_running_balance))
        .route("/:id/payments", get(member_payments))
        .route("/:id/ledger.csv", get(member_ledger_csv))
        .route("/:id/payments.csv", get(member_payments_csv))
}

pub async fn upsert_member(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<MemberId>,
    Json(body): Json<dto::UpsertMemberRequest>,
) -> axum::response::Response {
    let member = match body.into_member(tenant.tenant_id(), id) {
        Ok(m) => m,
        Err(resp) => return resp,
    };

    match services.directory.upsert_member(tenant.tenant_id(), member.clone()).await {
        Ok(()) => (StatusCode::OK, Json(member)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

async fn snapshot(
    services: &AppServices,
    tenant: TenantContext,
    member_id: MemberId,
    window: TimeWindow,
) -> Result<Vec<PaymentRecord>, axum::response::Response> {
    services
        .member_history(tenant.tenant_id(), member_id, window)
        .await
        .map_err(errors::store_error_to_response)
}

fn csv_download(filename: String, body: String) -> axum::response::Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\"")),
        ],
        body,
    )
        .into_response()
}

pub async fn member_ledger(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<MemberId>,
    Query(q): Query<dto::AsOfQuery>,
) -> axum::response::Response {
    let cutoff = match q.cutoff() {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let payments = match snapshot(&services, tenant, id, TimeWindow::all()).await {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    let ledger = MemberLedger::build(&payments, cutoff);
    (StatusCode::OK, Json(dto::ledger_to_json(&ledger, &services.currency))).into_response()
}

pub async fn member_balance(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<MemberId>,
    Query(q): Query<dto::AsOfQuery>,
) -> axum::response::Response {
    let cutoff = match q.cutoff() {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let window = cutoff.map(TimeWindow::until).unwrap_or_default();
    let payments = match snapshot(&services, tenant, id, window).await {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    let balance = balance_as_of(&payments, cutoff);
    (StatusCode::OK, Json(dto::balance_to_json(balance, cutoff, &services.currency))).into_response()
}

pub async fn member_running_balance(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<MemberId>,
) -> axum::response::Response {
    let payments = match snapshot(&services, tenant, id, TimeWindow::all()).await {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    let rows = running_balance(&payments);
    (StatusCode::OK, Json(serde_json::json!({ "items": rows }))).into_response()
}

/// Payments inside `from`/`to`, each with the balance as of that payment.
///
/// Balances are computed over the full history so rows before `from` still
/// count toward them.
pub async fn member_payments(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<MemberId>,
    Query(q): Query<dto::WindowQuery>,
) -> axum::response::Response {
    let window = match q.window() {
        Ok(w) => w,
        Err(resp) => return resp,
    };
    let payments = match snapshot(&services, tenant, id, TimeWindow::all()).await {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    let items = payment_balances(&payments)
        .iter()
        .filter(|row| window.contains(row.payment.created_at))
        .map(|row| dto::payment_balance_to_json(row, &services.currency))
        .collect::<Vec<_>>();
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

pub async fn member_ledger_csv(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<MemberId>,
    Query(q): Query<dto::AsOfQuery>,
) -> axum::response::Response {
    let cutoff = match q.cutoff() {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let payments = match snapshot(&services, tenant, id, TimeWindow::all()).await {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    match ledger_csv(&payments, cutoff) {
        Ok(body) => csv_download(format!("ledger-{id}.csv"), body),
        Err(e) => errors::render_error_to_response(e),
    }
}

pub async fn member_payments_csv(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<MemberId>,
    Query(q): Query<dto::WindowQuery>,
) -> axum::response::Response {
    let window = match q.window() {
        Ok(w) => w,
        Err(resp) => return resp,
    };
    let payments = match snapshot(&services, tenant, id, TimeWindow::all()).await {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    let rows = payment_balances(&payments)
        .into_iter()
        .filter(|row| window.contains(row.payment.created_at))
        .collect::<Vec<_>>();

    match payments_csv(&rows) {
        Ok(body) => csv_download(format!("payments-{id}.csv"), body),
        Err(e) => errors::render_error_to_response(e),
    }
}
