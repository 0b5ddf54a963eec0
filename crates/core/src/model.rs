//! Identity vs. value semantics for domain types.

/// Something that stays the same thing while its data changes.
///
/// A variant is identified by its combination key while price and stock are
/// edited; a dimension by its attribute id while its options get reordered.
pub trait Entity {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;

    /// Same identity, regardless of the rest of the state.
    fn is_same_entity(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

/// Plain data compared field by field, with no identity of its own.
///
/// Two option values with the same id, label and display order are
/// interchangeable; a combination key is nothing more than its ordered pairs.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
