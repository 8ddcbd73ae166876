//! Postgres-backed repositories.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (other) | any | `Database` |
//! | PoolClosed / other | N/A | `Database` |
//!
//! Every statement carries `tenant_id` in its key or WHERE clause.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use gymdesk_billing::{amount, BranchProfile, Member, PaymentMethod, PaymentRecord, PaymentStatus};
use gymdesk_core::{BranchId, MemberId, PaymentId, TenantId};

use super::{ensure_tenant, DirectoryRepository, PaymentRepository, StoreError, TimeWindow};

const SCHEMA: &str = include_str!("../../sql/schema.sql");

/// Create tables and indexes if they do not exist.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::raw_sql(SCHEMA)
        .execute(pool)
        .await
        .map_err(|e| map_sqlx_error("ensure_schema", e))?;
    Ok(())
}

const PAYMENT_COLUMNS: &str = r#"
    id,
    tenant_id,
    branch_id,
    member_id,
    payable_amount::text AS payable_amount,
    amount::text AS amount,
    extra_discount::text AS extra_discount,
    description,
    payment_method,
    status,
    created_at
"#;

#[derive(Debug, Clone)]
pub struct PostgresPaymentRepository {
    pool: Arc<PgPool>,
}

impl PostgresPaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }
}

fn payment_from_row(row: &PgRow) -> Result<PaymentRecord, sqlx::Error> {
    let status: String = row.try_get("status")?;
    // An unknown status must not hide the row from the ledger.
    let status = status.parse().unwrap_or_else(|_| {
        tracing::warn!(status = %status, "unknown payment status in storage; treating as paid");
        PaymentStatus::Paid
    });

    Ok(PaymentRecord {
        id: PaymentId::from_uuid(row.try_get("id")?),
        tenant_id: TenantId::from_uuid(row.try_get("tenant_id")?),
        branch_id: row.try_get::<Option<Uuid>, _>("branch_id")?.map(BranchId::from_uuid),
        member_id: MemberId::from_uuid(row.try_get("member_id")?),
        payable_amount: amount::coerce_opt_str(row.try_get::<Option<String>, _>("payable_amount")?.as_deref()),
        amount: amount::coerce_opt_str(row.try_get::<Option<String>, _>("amount")?.as_deref()),
        extra_discount: amount::coerce_opt_str(row.try_get::<Option<String>, _>("extra_discount")?.as_deref()),
        description: row.try_get("description")?,
        payment_method: PaymentMethod::from(row.try_get::<String, _>("payment_method")?),
        status,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

#[async_trait]
impl PaymentRepository for PostgresPaymentRepository {
    #[instrument(skip(self, payment), fields(tenant_id = %tenant_id, payment_id = %payment.id), err)]
    async fn record(&self, tenant_id: TenantId, payment: PaymentRecord) -> Result<PaymentRecord, StoreError> {
        ensure_tenant(tenant_id, payment.tenant_id, "payment")?;

        sqlx::query(
            r#"
            INSERT INTO payments (
                tenant_id, id, branch_id, member_id,
                payable_amount, amount, extra_discount,
                description, payment_method, status, created_at
            )
            VALUES ($1, $2, $3, $4, $5::numeric, $6::numeric, $7::numeric, $8, $9, $10, $11)
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(payment.id.as_uuid())
        .bind(payment.branch_id.map(Uuid::from))
        .bind(payment.member_id.as_uuid())
        .bind(payment.payable_amount.to_string())
        .bind(payment.amount.to_string())
        .bind(payment.extra_discount.to_string())
        .bind(payment.description.as_deref())
        .bind(payment.payment_method.code())
        .bind(payment.status.as_str())
        .bind(payment.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("record_payment", e))?;

        Ok(payment)
    }

    #[instrument(skip(self), fields(tenant_id = %tenant_id, payment_id = %payment_id), err)]
    async fn get(&self, tenant_id: TenantId, payment_id: PaymentId) -> Result<Option<PaymentRecord>, StoreError> {
        let sql = format!("SELECT {PAYMENT_COLUMNS} FROM payments WHERE tenant_id = $1 AND id = $2");
        let row = sqlx::query(&sql)
            .bind(tenant_id.as_uuid())
            .bind(payment_id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_payment", e))?;

        row.as_ref()
            .map(payment_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("get_payment", e))
    }

    #[instrument(
        skip(self),
        fields(tenant_id = %tenant_id, member_id = %member_id, payment_count = tracing::field::Empty),
        err
    )]
    async fn list_for_member(
        &self,
        tenant_id: TenantId,
        member_id: MemberId,
        window: TimeWindow,
    ) -> Result<Vec<PaymentRecord>, StoreError> {
        let sql = format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments \
             WHERE tenant_id = $1 AND member_id = $2 \
               AND ($3::timestamptz IS NULL OR created_at >= $3) \
               AND ($4::timestamptz IS NULL OR created_at <= $4) \
             ORDER BY created_at ASC, id ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(tenant_id.as_uuid())
            .bind(member_id.as_uuid())
            .bind(window.from)
            .bind(window.to)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_member_payments", e))?;

        let payments = rows
            .iter()
            .map(payment_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_sqlx_error("list_member_payments", e))?;

        tracing::Span::current().record("payment_count", payments.len());
        Ok(payments)
    }

    #[instrument(skip(self), fields(tenant_id = %tenant_id, payment_id = %payment_id), err)]
    async fn update_status(
        &self,
        tenant_id: TenantId,
        payment_id: PaymentId,
        status: PaymentStatus,
    ) -> Result<PaymentRecord, StoreError> {
        let sql = format!(
            "UPDATE payments SET status = $3 WHERE tenant_id = $1 AND id = $2 RETURNING {PAYMENT_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(tenant_id.as_uuid())
            .bind(payment_id.as_uuid())
            .bind(status.as_str())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_payment_status", e))?
            .ok_or(StoreError::NotFound)?;

        payment_from_row(&row).map_err(|e| map_sqlx_error("update_payment_status", e))
    }
}

#[derive(Debug, Clone)]
pub struct PostgresDirectoryRepository {
    pool: Arc<PgPool>,
}

impl PostgresDirectoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }
}

#[async_trait]
impl DirectoryRepository for PostgresDirectoryRepository {
    #[instrument(skip(self), fields(tenant_id = %tenant_id, member_id = %member_id), err)]
    async fn member(&self, tenant_id: TenantId, member_id: MemberId) -> Result<Option<Member>, StoreError> {
        let row = sqlx::query(
            "SELECT id, tenant_id, branch_id, name, phone FROM members WHERE tenant_id = $1 AND id = $2",
        )
        .bind(tenant_id.as_uuid())
        .bind(member_id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_member", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let member = (|| -> Result<Member, sqlx::Error> {
            Ok(Member {
                id: MemberId::from_uuid(row.try_get("id")?),
                tenant_id: TenantId::from_uuid(row.try_get("tenant_id")?),
                branch_id: row.try_get::<Option<Uuid>, _>("branch_id")?.map(BranchId::from_uuid),
                name: row.try_get("name")?,
                phone: row.try_get("phone")?,
            })
        })()
        .map_err(|e| map_sqlx_error("get_member", e))?;

        Ok(Some(member))
    }

    #[instrument(skip(self, member), fields(tenant_id = %tenant_id, member_id = %member.id), err)]
    async fn upsert_member(&self, tenant_id: TenantId, member: Member) -> Result<(), StoreError> {
        ensure_tenant(tenant_id, member.tenant_id, "member")?;

        sqlx::query(
            r#"
            INSERT INTO members (tenant_id, id, branch_id, name, phone)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (tenant_id, id)
            DO UPDATE SET branch_id = EXCLUDED.branch_id, name = EXCLUDED.name, phone = EXCLUDED.phone
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(member.id.as_uuid())
        .bind(member.branch_id.map(Uuid::from))
        .bind(&member.name)
        .bind(member.phone.as_deref())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("upsert_member", e))?;

        Ok(())
    }

    #[instrument(skip(self), fields(tenant_id = %tenant_id, branch_id = %branch_id), err)]
    async fn branch(&self, tenant_id: TenantId, branch_id: BranchId) -> Result<Option<BranchProfile>, StoreError> {
        let row = sqlx::query(
            "SELECT id, tenant_id, gym_name, branch_name, address, phone \
             FROM branches WHERE tenant_id = $1 AND id = $2",
        )
        .bind(tenant_id.as_uuid())
        .bind(branch_id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_branch", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let branch = (|| -> Result<BranchProfile, sqlx::Error> {
            Ok(BranchProfile {
                id: BranchId::from_uuid(row.try_get("id")?),
                tenant_id: TenantId::from_uuid(row.try_get("tenant_id")?),
                gym_name: row.try_get("gym_name")?,
                branch_name: row.try_get("branch_name")?,
                address: row.try_get("address")?,
                phone: row.try_get("phone")?,
            })
        })()
        .map_err(|e| map_sqlx_error("get_branch", e))?;

        Ok(Some(branch))
    }

    #[instrument(skip(self, branch), fields(tenant_id = %tenant_id, branch_id = %branch.id), err)]
    async fn upsert_branch(&self, tenant_id: TenantId, branch: BranchProfile) -> Result<(), StoreError> {
        ensure_tenant(tenant_id, branch.tenant_id, "branch")?;

        sqlx::query(
            r#"
            INSERT INTO branches (tenant_id, id, gym_name, branch_name, address, phone)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (tenant_id, id)
            DO UPDATE SET gym_name = EXCLUDED.gym_name, branch_name = EXCLUDED.branch_name,
                          address = EXCLUDED.address, phone = EXCLUDED.phone
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(branch.id.as_uuid())
        .bind(&branch.gym_name)
        .bind(&branch.branch_name)
        .bind(branch.address.as_deref())
        .bind(branch.phone.as_deref())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("upsert_branch", e))?;

        Ok(())
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Conflict(msg),
                _ => StoreError::Database(msg),
            }
        }
        sqlx::Error::PoolClosed => StoreError::Database(format!("connection pool closed in {}", operation)),
        _ => StoreError::Database(format!("sqlx error in {}: {}", operation, err)),
    }
}
