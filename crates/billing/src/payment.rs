use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gymdesk_core::{BranchId, DomainError, Entity, MemberId, Money, PaymentId, TenantId};

use crate::amount;

/// How a payment was collected.
///
/// Stored as free text upstream, so unknown methods are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Upi,
    Card,
    BankTransfer,
    Cheque,
    Other(String),
}

impl PaymentMethod {
    /// Canonical storage code (`"upi"`, `"bank_transfer"`, ...).
    pub fn code(&self) -> &str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Upi => "upi",
            PaymentMethod::Card => "card",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Cheque => "cheque",
            PaymentMethod::Other(s) => s.as_str(),
        }
    }

    /// Human-readable label used in ledger particulars and receipts.
    pub fn label(&self) -> &str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Upi => "UPI",
            PaymentMethod::Card => "Card",
            PaymentMethod::BankTransfer => "Bank Transfer",
            PaymentMethod::Cheque => "Cheque",
            PaymentMethod::Other(s) => s.as_str(),
        }
    }
}

impl From<String> for PaymentMethod {
    fn from(value: String) -> Self {
        let normalized = value.trim().to_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "" | "cash" => PaymentMethod::Cash,
            "upi" | "gpay" | "phonepe" | "paytm" => PaymentMethod::Upi,
            "card" | "credit_card" | "debit_card" => PaymentMethod::Card,
            "bank_transfer" | "bank" | "neft" | "imps" | "rtgs" => PaymentMethod::BankTransfer,
            "cheque" | "check" => PaymentMethod::Cheque,
            _ => PaymentMethod::Other(value.trim().to_string()),
        }
    }
}

impl From<PaymentMethod> for String {
    fn from(value: PaymentMethod) -> Self {
        value.code().to_string()
    }
}

impl core::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Payment status lifecycle. The only mutable attribute of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Paid,
    Pending,
    Cancelled,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Paid => "paid",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Cancelled => "cancelled",
        }
    }
}

impl core::str::FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "paid" => Ok(PaymentStatus::Paid),
            "pending" => Ok(PaymentStatus::Pending),
            "cancelled" | "canceled" => Ok(PaymentStatus::Cancelled),
            other => Err(DomainError::validation(format!(
                "unknown payment status '{other}' (expected paid, pending or cancelled)"
            ))),
        }
    }
}

/// A payment row for one member.
///
/// `payable_amount` is the charge (debit), `amount` the money received and
/// `extra_discount` an additional concession (both credits). Amount fields
/// deserialize leniently: anything non-numeric is zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: PaymentId,
    pub tenant_id: TenantId,
    #[serde(default)]
    pub branch_id: Option<BranchId>,
    pub member_id: MemberId,
    #[serde(default, deserialize_with = "amount::lenient")]
    pub payable_amount: Money,
    #[serde(default, deserialize_with = "amount::lenient")]
    pub amount: Money,
    #[serde(default, deserialize_with = "amount::lenient")]
    pub extra_discount: Money,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

impl PaymentRecord {
    /// Zero-amount record; fill in amounts with the `with_*` helpers.
    pub fn new(tenant_id: TenantId, member_id: MemberId, created_at: DateTime<Utc>) -> Self {
        Self {
            id: PaymentId::new(),
            tenant_id,
            branch_id: None,
            member_id,
            payable_amount: Money::ZERO,
            amount: Money::ZERO,
            extra_discount: Money::ZERO,
            description: None,
            payment_method: PaymentMethod::default(),
            status: PaymentStatus::default(),
            created_at,
        }
    }

    pub fn with_payable(mut self, payable_amount: Money) -> Self {
        self.payable_amount = payable_amount;
        self
    }

    pub fn with_received(mut self, amount: Money) -> Self {
        self.amount = amount;
        self
    }

    pub fn with_discount(mut self, extra_discount: Money) -> Self {
        self.extra_discount = extra_discount;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_method(mut self, method: PaymentMethod) -> Self {
        self.payment_method = method;
        self
    }

    pub fn with_branch(mut self, branch_id: BranchId) -> Self {
        self.branch_id = Some(branch_id);
        self
    }

    /// Description trimmed to `None` when blank.
    pub fn description_text(&self) -> Option<&str> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

impl Entity for PaymentRecord {
    type Id = PaymentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
