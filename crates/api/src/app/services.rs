//! Service wiring: which repositories back the API, plus the snapshot
//! fetches shared by several handlers.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use gymdesk_billing::{CurrencyFormat, Member, PaymentRecord};
use gymdesk_core::{MemberId, PaymentId, TenantId};
use gymdesk_infra::{
    repository::postgres::ensure_schema, AppConfig, DirectoryRepository,
    InMemoryDirectoryRepository, InMemoryPaymentRepository, PaymentRepository,
    PostgresDirectoryRepository, PostgresPaymentRepository, StorageConfig, StoreError, TimeWindow,
};
use gymdesk_receipts::Receipt;

const MAX_DB_CONNECTIONS: u32 = 5;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to connect to postgres: {0}")]
    Connect(#[from] sqlx::Error),

    #[error("failed to prepare schema: {0}")]
    Schema(#[from] StoreError),
}

pub struct AppServices {
    pub payments: Arc<dyn PaymentRepository>,
    pub directory: Arc<dyn DirectoryRepository>,
    pub currency: CurrencyFormat,
    pub default_country_code: String,
}

/// Build services per `config.storage`.
pub async fn build_services(config: &AppConfig) -> Result<Arc<AppServices>, BuildError> {
    match &config.storage {
        StorageConfig::InMemory => Ok(Arc::new(AppServices::in_memory(config))),
        StorageConfig::Postgres { database_url } => {
            let pool = PgPoolOptions::new()
                .max_connections(MAX_DB_CONNECTIONS)
                .connect(database_url)
                .await?;
            ensure_schema(&pool).await?;
            tracing::info!("using postgres repositories");

            Ok(Arc::new(AppServices {
                payments: Arc::new(PostgresPaymentRepository::new(pool.clone())),
                directory: Arc::new(PostgresDirectoryRepository::new(pool)),
                currency: config.currency.clone(),
                default_country_code: config.default_country_code.clone(),
            }))
        }
    }
}

impl AppServices {
    pub fn in_memory(config: &AppConfig) -> Self {
        Self {
            payments: Arc::new(InMemoryPaymentRepository::new()),
            directory: Arc::new(InMemoryDirectoryRepository::new()),
            currency: config.currency.clone(),
            default_country_code: config.default_country_code.clone(),
        }
    }

    pub async fn member_history(
        &self,
        tenant_id: TenantId,
        member_id: MemberId,
        window: TimeWindow,
    ) -> Result<Vec<PaymentRecord>, StoreError> {
        self.payments.list_for_member(tenant_id, member_id, window).await
    }

    /// Assemble the receipt for one payment, or `None` if the payment is unknown.
    ///
    /// Only history up to the payment's own timestamp is fetched. A member
    /// without a directory entry still gets a receipt under a generic name.
    pub async fn receipt(
        &self,
        tenant_id: TenantId,
        payment_id: PaymentId,
    ) -> Result<Option<Receipt>, StoreError> {
        let Some(payment) = self.payments.get(tenant_id, payment_id).await? else {
            return Ok(None);
        };

        let history = self
            .member_history(tenant_id, payment.member_id, TimeWindow::until(payment.created_at))
            .await?;

        let member = match self.directory.member(tenant_id, payment.member_id).await? {
            Some(m) => m,
            None => {
                tracing::debug!(member_id = %payment.member_id, "member not in directory");
                Member {
                    id: payment.member_id,
                    tenant_id,
                    branch_id: payment.branch_id,
                    name: "Member".to_string(),
                    phone: None,
                }
            }
        };

        let branch = match payment.branch_id.or(member.branch_id) {
            Some(branch_id) => self.directory.branch(tenant_id, branch_id).await?,
            None => None,
        };

        Ok(Receipt::assemble(
            payment_id,
            &history,
            &member,
            branch.as_ref(),
            self.currency.clone(),
        ))
    }
}
