//! Infrastructure layer: repositories, tenant-isolated stores, configuration.

pub mod config;
pub mod read_model;
pub mod repository;

pub use config::{AppConfig, ConfigError, StorageConfig};
pub use repository::{
    DirectoryRepository, InMemoryDirectoryRepository, InMemoryPaymentRepository,
    PaymentRepository, PostgresDirectoryRepository, PostgresPaymentRepository, StoreError,
    TimeWindow,
};
