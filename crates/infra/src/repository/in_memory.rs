use async_trait::async_trait;

use gymdesk_billing::{BranchProfile, Member, PaymentRecord, PaymentStatus};
use gymdesk_core::{BranchId, MemberId, PaymentId, TenantId};

use super::{ensure_tenant, DirectoryRepository, PaymentRepository, StoreError, TimeWindow};
use crate::read_model::{InMemoryTenantStore, TenantStore};

/// Process-local payment store for dev and tests.
#[derive(Debug, Default)]
pub struct InMemoryPaymentRepository {
    payments: InMemoryTenantStore<PaymentId, PaymentRecord>,
}

impl InMemoryPaymentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
    async fn record(&self, tenant_id: TenantId, payment: PaymentRecord) -> Result<PaymentRecord, StoreError> {
        ensure_tenant(tenant_id, payment.tenant_id, "payment")?;

        if !self.payments.insert_new(tenant_id, payment.id, payment.clone()) {
            return Err(StoreError::Conflict(format!("payment {} already exists", payment.id)));
        }

        tracing::debug!(tenant_id = %tenant_id, payment_id = %payment.id, "payment recorded");
        Ok(payment)
    }

    async fn get(&self, tenant_id: TenantId, payment_id: PaymentId) -> Result<Option<PaymentRecord>, StoreError> {
        Ok(self.payments.get(tenant_id, &payment_id))
    }

    async fn list_for_member(
        &self,
        tenant_id: TenantId,
        member_id: MemberId,
        window: TimeWindow,
    ) -> Result<Vec<PaymentRecord>, StoreError> {
        let mut out: Vec<PaymentRecord> = self
            .payments
            .list(tenant_id)
            .into_iter()
            .filter(|p| p.member_id == member_id && window.contains(p.created_at))
            .collect();
        // HashMap order is arbitrary; id breaks timestamp ties deterministically.
        out.sort_by_key(|p| (p.created_at, *p.id.as_uuid()));
        Ok(out)
    }

    async fn update_status(
        &self,
        tenant_id: TenantId,
        payment_id: PaymentId,
        status: PaymentStatus,
    ) -> Result<PaymentRecord, StoreError> {
        let mut payment = self
            .payments
            .get(tenant_id, &payment_id)
            .ok_or(StoreError::NotFound)?;
        payment.status = status;
        self.payments.upsert(tenant_id, payment_id, payment.clone());
        Ok(payment)
    }
}

/// Process-local member/branch directory for dev and tests.
#[derive(Debug, Default)]
pub struct InMemoryDirectoryRepository {
    members: InMemoryTenantStore<MemberId, Member>,
    branches: InMemoryTenantStore<BranchId, BranchProfile>,
}

impl InMemoryDirectoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DirectoryRepository for InMemoryDirectoryRepository {
    async fn member(&self, tenant_id: TenantId, member_id: MemberId) -> Result<Option<Member>, StoreError> {
        Ok(self.members.get(tenant_id, &member_id))
    }

    async fn upsert_member(&self, tenant_id: TenantId, member: Member) -> Result<(), StoreError> {
        ensure_tenant(tenant_id, member.tenant_id, "member")?;
        self.members.upsert(tenant_id, member.id, member);
        Ok(())
    }

    async fn branch(&self, tenant_id: TenantId, branch_id: BranchId) -> Result<Option<BranchProfile>, StoreError> {
        Ok(self.branches.get(tenant_id, &branch_id))
    }

    async fn upsert_branch(&self, tenant_id: TenantId, branch: BranchProfile) -> Result<(), StoreError> {
        ensure_tenant(tenant_id, branch.tenant_id, "branch")?;
        self.branches.upsert(tenant_id, branch.id, branch);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use gymdesk_core::Money;

    fn at(day: i64) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 1, 10, 0, 0).unwrap() + Duration::days(day)
    }

    #[tokio::test]
    async fn lists_member_payments_in_time_order_within_window() {
        let repo = InMemoryPaymentRepository::new();
        let tenant = TenantId::new();
        let member = MemberId::new();
        let other = MemberId::new();

        for day in [5, 1, 3] {
            let p = PaymentRecord::new(tenant, member, at(day)).with_received(Money::from_major(day * 100));
            repo.record(tenant, p).await.unwrap();
        }
        repo.record(tenant, PaymentRecord::new(tenant, other, at(2))).await.unwrap();

        let all = repo.list_for_member(tenant, member, TimeWindow::all()).await.unwrap();
        let days: Vec<_> = all.iter().map(|p| p.created_at).collect();
        assert_eq!(days, vec![at(1), at(3), at(5)]);

        let window = TimeWindow { from: Some(at(2)), to: Some(at(3)) };
        let windowed = repo.list_for_member(tenant, member, window).await.unwrap();
        assert_eq!(windowed.len(), 1);
        assert_eq!(windowed[0].created_at, at(3));
    }

    #[tokio::test]
    async fn payments_are_tenant_isolated() {
        let repo = InMemoryPaymentRepository::new();
        let tenant = TenantId::new();
        let intruder = TenantId::new();
        let member = MemberId::new();
        let p = repo.record(tenant, PaymentRecord::new(tenant, member, at(0))).await.unwrap();

        assert!(repo.get(intruder, p.id).await.unwrap().is_none());
        assert!(repo.list_for_member(intruder, member, TimeWindow::all()).await.unwrap().is_empty());
        assert_eq!(
            repo.update_status(intruder, p.id, PaymentStatus::Cancelled).await,
            Err(StoreError::NotFound)
        );

        let foreign = PaymentRecord::new(tenant, member, at(1));
        assert!(matches!(
            repo.record(intruder, foreign).await,
            Err(StoreError::TenantIsolation(_))
        ));
    }

    #[tokio::test]
    async fn duplicate_payment_ids_conflict() {
        let repo = InMemoryPaymentRepository::new();
        let tenant = TenantId::new();
        let p = PaymentRecord::new(tenant, MemberId::new(), at(0));
        repo.record(tenant, p.clone()).await.unwrap();
        assert!(matches!(repo.record(tenant, p).await, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn status_is_the_only_mutation() {
        let repo = InMemoryPaymentRepository::new();
        let tenant = TenantId::new();
        let p = PaymentRecord::new(tenant, MemberId::new(), at(0)).with_payable(Money::from_major(900));
        repo.record(tenant, p.clone()).await.unwrap();

        let updated = repo.update_status(tenant, p.id, PaymentStatus::Pending).await.unwrap();
        assert_eq!(updated.status, PaymentStatus::Pending);
        assert_eq!(updated.payable_amount, p.payable_amount);
        assert_eq!(repo.get(tenant, p.id).await.unwrap().unwrap().status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn directory_round_trip() {
        let repo = InMemoryDirectoryRepository::new();
        let tenant = TenantId::new();
        let member = Member {
            id: MemberId::new(),
            tenant_id: tenant,
            branch_id: None,
            name: "Ravi".to_string(),
            phone: None,
        };
        repo.upsert_member(tenant, member.clone()).await.unwrap();
        assert_eq!(repo.member(tenant, member.id).await.unwrap(), Some(member.clone()));
        assert!(repo.member(TenantId::new(), member.id).await.unwrap().is_none());
        assert!(repo.upsert_member(TenantId::new(), member).await.is_err());
    }
}
