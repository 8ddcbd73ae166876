use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use gymdesk_billing::{
    amount, BalanceStatus, BranchProfile, CurrencyFormat, Member, MemberLedger, PaymentBalance,
    PaymentMethod, PaymentRecord, PaymentStatus,
};
use gymdesk_core::{BranchId, MemberId, Money, TenantId};
use gymdesk_infra::TimeWindow;

use crate::app::errors::{domain_error_to_response, json_error};

#[derive(Debug, Deserialize)]
pub struct RecordPaymentRequest {
    pub member_id: MemberId,
    #[serde(default)]
    pub branch_id: Option<BranchId>,
    #[serde(default, deserialize_with = "amount::lenient")]
    pub payable_amount: Money,
    #[serde(default, deserialize_with = "amount::lenient")]
    pub amount: Money,
    #[serde(default, deserialize_with = "amount::lenient")]
    pub extra_discount: Money,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    /// Parsed like the status update body; absent or blank means paid.
    #[serde(default)]
    pub status: Option<String>,
    /// Defaults to the time the request is handled.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl RecordPaymentRequest {
    pub fn into_record(self, tenant_id: TenantId) -> Result<PaymentRecord, axum::response::Response> {
        let status = match self.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => raw.parse::<PaymentStatus>().map_err(domain_error_to_response)?,
            None => PaymentStatus::default(),
        };
        let created_at = self.created_at.unwrap_or_else(Utc::now);
        let mut record = PaymentRecord::new(tenant_id, self.member_id, created_at)
            .with_payable(self.payable_amount)
            .with_received(self.amount)
            .with_discount(self.extra_discount)
            .with_method(self.payment_method.unwrap_or_default());
        if let Some(description) = self.description {
            record = record.with_description(description);
        }
        if let Some(branch_id) = self.branch_id {
            record = record.with_branch(branch_id);
        }
        record.status = status;
        Ok(record)
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct UpsertMemberRequest {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub branch_id: Option<BranchId>,
}

impl UpsertMemberRequest {
    pub fn into_member(self, tenant_id: TenantId, id: MemberId) -> Result<Member, axum::response::Response> {
        let name = non_blank("name", self.name)?;
        Ok(Member {
            id,
            tenant_id,
            branch_id: self.branch_id,
            name,
            phone: self.phone.filter(|p| !p.trim().is_empty()),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct UpsertBranchRequest {
    pub gym_name: String,
    pub branch_name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl UpsertBranchRequest {
    pub fn into_branch(self, tenant_id: TenantId, id: BranchId) -> Result<BranchProfile, axum::response::Response> {
        Ok(BranchProfile {
            id,
            tenant_id,
            gym_name: non_blank("gym_name", self.gym_name)?,
            branch_name: non_blank("branch_name", self.branch_name)?,
            address: self.address,
            phone: self.phone,
        })
    }
}

fn non_blank(field: &str, value: String) -> Result<String, axum::response::Response> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            format!("{field} cannot be empty"),
        ));
    }
    Ok(trimmed.to_string())
}

#[derive(Debug, Default, Deserialize)]
pub struct AsOfQuery {
    pub as_of: Option<String>,
}

impl AsOfQuery {
    pub fn cutoff(&self) -> Result<Option<DateTime<Utc>>, axum::response::Response> {
        parse_instant("as_of", self.as_of.as_deref())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct WindowQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl WindowQuery {
    pub fn window(&self) -> Result<TimeWindow, axum::response::Response> {
        Ok(TimeWindow {
            from: parse_instant("from", self.from.as_deref())?,
            to: parse_instant("to", self.to.as_deref())?,
        })
    }
}

/// RFC3339 timestamp; absent or empty means "no bound".
pub fn parse_instant(
    field: &str,
    raw: Option<&str>,
) -> Result<Option<DateTime<Utc>>, axum::response::Response> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|e| {
                json_error(
                    StatusCode::BAD_REQUEST,
                    "validation_error",
                    format!("{field} must be an RFC3339 timestamp: {e}"),
                )
            }),
    }
}

pub fn ledger_to_json(ledger: &MemberLedger, fmt: &CurrencyFormat) -> serde_json::Value {
    let status = ledger.status();
    json!({
        "as_of": ledger.as_of,
        "debits": ledger.debits,
        "credits": ledger.credits,
        "total_debit": ledger.total_debit,
        "total_credit": ledger.total_credit,
        "balance": ledger.balance,
        "status": status,
        "label": status.label(),
        "formatted_balance": fmt.format(ledger.balance),
    })
}

/// The balance badge: signed amount, classification and display string.
pub fn balance_to_json(
    balance: Money,
    as_of: Option<DateTime<Utc>>,
    fmt: &CurrencyFormat,
) -> serde_json::Value {
    let status = BalanceStatus::of(balance);
    json!({
        "as_of": as_of,
        "balance": balance,
        "status": status,
        "label": status.label(),
        "formatted": fmt.format(balance.abs()),
    })
}

pub fn payment_balance_to_json(row: &PaymentBalance, fmt: &CurrencyFormat) -> serde_json::Value {
    json!({
        "payment": row.payment,
        "balance_as_of": row.balance_as_of,
        "status": row.status,
        "label": row.status.label(),
        "formatted_balance": fmt.format(row.balance_as_of.abs()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_request_coerces_junk_amounts() {
        let tenant = TenantId::new();
        let member = MemberId::new();
        let body = json!({
            "member_id": member,
            "payable_amount": "1,000",
            "amount": "abc",
            "extra_discount": null,
            "payment_method": "upi",
        });
        let req: RecordPaymentRequest = serde_json::from_value(body).unwrap();
        let record = req.into_record(tenant).unwrap();

        assert_eq!(record.tenant_id, tenant);
        assert_eq!(record.member_id, member);
        assert_eq!(record.amount, Money::ZERO);
        assert_eq!(record.extra_discount, Money::ZERO);
        assert_eq!(record.payment_method, PaymentMethod::Upi);
        assert_eq!(record.status, PaymentStatus::Paid);
    }

    #[test]
    fn record_request_status_accepts_any_case_and_rejects_unknown() {
        let request = |status: serde_json::Value| -> RecordPaymentRequest {
            serde_json::from_value(json!({ "member_id": MemberId::new(), "status": status })).unwrap()
        };

        let record = request(json!("Canceled")).into_record(TenantId::new()).unwrap();
        assert_eq!(record.status, PaymentStatus::Cancelled);

        let record = request(json!(" PENDING ")).into_record(TenantId::new()).unwrap();
        assert_eq!(record.status, PaymentStatus::Pending);

        let record = request(json!("")).into_record(TenantId::new()).unwrap();
        assert_eq!(record.status, PaymentStatus::Paid);

        let err = request(json!("refunded")).into_record(TenantId::new()).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn instants_parse_rfc3339_or_reject() {
        assert_eq!(parse_instant("as_of", None).unwrap(), None);
        assert_eq!(parse_instant("as_of", Some("  ")).unwrap(), None);

        let parsed = parse_instant("as_of", Some("2024-05-01T10:00:00+05:30")).unwrap().unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-05-01T04:30:00+00:00");

        let err = parse_instant("as_of", Some("yesterday")).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn blank_member_name_is_rejected() {
        let req = UpsertMemberRequest { name: "  ".to_string(), phone: None, branch_id: None };
        let err = req.into_member(TenantId::new(), MemberId::new()).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
