//! Repositories: the data-fetch side of every ledger computation.
//!
//! Handlers fetch a payment snapshot through these traits and hand it to the
//! pure calculator in `gymdesk-billing`. Every method is tenant-scoped.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use gymdesk_billing::{BranchProfile, Member, PaymentRecord, PaymentStatus};
use gymdesk_core::{BranchId, MemberId, PaymentId, TenantId};

pub mod in_memory;
pub mod postgres;

pub use in_memory::{InMemoryDirectoryRepository, InMemoryPaymentRepository};
pub use postgres::{PostgresDirectoryRepository, PostgresPaymentRepository};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("tenant isolation violation: {0}")]
    TenantIsolation(String),

    #[error("database error: {0}")]
    Database(String),
}

/// Optional inclusive bounds on `created_at`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct TimeWindow {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl TimeWindow {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn until(to: DateTime<Utc>) -> Self {
        Self { from: None, to: Some(to) }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from.is_none_or(|f| at >= f) && self.to.is_none_or(|t| at <= t)
    }
}

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Persist a new payment. Payments are immutable apart from status.
    async fn record(&self, tenant_id: TenantId, payment: PaymentRecord) -> Result<PaymentRecord, StoreError>;

    async fn get(&self, tenant_id: TenantId, payment_id: PaymentId) -> Result<Option<PaymentRecord>, StoreError>;

    /// A member's payments inside `window`, ascending by `created_at`.
    async fn list_for_member(
        &self,
        tenant_id: TenantId,
        member_id: MemberId,
        window: TimeWindow,
    ) -> Result<Vec<PaymentRecord>, StoreError>;

    async fn update_status(
        &self,
        tenant_id: TenantId,
        payment_id: PaymentId,
        status: PaymentStatus,
    ) -> Result<PaymentRecord, StoreError>;
}

#[async_trait]
pub trait DirectoryRepository: Send + Sync {
    async fn member(&self, tenant_id: TenantId, member_id: MemberId) -> Result<Option<Member>, StoreError>;

    async fn upsert_member(&self, tenant_id: TenantId, member: Member) -> Result<(), StoreError>;

    async fn branch(&self, tenant_id: TenantId, branch_id: BranchId) -> Result<Option<BranchProfile>, StoreError>;

    async fn upsert_branch(&self, tenant_id: TenantId, branch: BranchProfile) -> Result<(), StoreError>;
}

pub(crate) fn ensure_tenant(expected: TenantId, actual: TenantId, what: &str) -> Result<(), StoreError> {
    if expected != actual {
        return Err(StoreError::TenantIsolation(format!(
            "{what} tenant_id does not match request tenant"
        )));
    }
    Ok(())
}
