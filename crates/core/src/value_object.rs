//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. `Money` is the
/// canonical one here: two amounts of 500.00 are the same amount no matter
/// which payment they came from.
///
/// ```ignore
/// use gymdesk_core::Money;
///
/// let a = Money::from_minor(50_000);
/// let b = Money::from_major(500);
/// assert_eq!(a, b);
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
