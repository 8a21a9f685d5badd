//! Entity trait for catalog records that keep a stable identity.

/// A catalog record addressable by a typed identifier.
///
/// Products, brands, and categories are owned by the administrative side of the
/// store; the discovery layer only reads them, but still compares them by id.
pub trait Entity {
    /// Strongly-typed identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the record identifier.
    fn id(&self) -> Self::Id;

    /// Whether two records denote the same stored row.
    fn same_identity(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}
