//! `gymdesk-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! tenant-scoped identifiers, money, and the shared error model.

pub mod entity;
pub mod error;
pub mod id;
pub mod money;
pub mod value_object;

pub use entity::Entity;
pub use error::DomainError;
pub use id::{BranchId, MemberId, PaymentId, TenantId};
pub use money::Money;
pub use value_object::ValueObject;
