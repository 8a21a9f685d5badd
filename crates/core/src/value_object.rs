//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have **no identity**: two prices of `19.99` are the same price.
/// They are immutable; "changing" one means constructing a new value.
///
/// ```ignore
/// #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// struct Price(u64);
///
/// impl ValueObject for Price {}
///
/// assert_eq!(Price(1999), Price(1999));
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
