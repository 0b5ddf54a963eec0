//! Decide/evolve contract for aggregates.
//!
//! An aggregate turns a command into events without touching its own state
//! (`handle`), then folds those events into state (`apply`). Keeping the two
//! apart means the same event log always rebuilds the same state.

/// Identity and revision of a consistency boundary.
pub trait AggregateRoot {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;

    /// Number of events applied so far.
    fn version(&self) -> u64;
}

pub trait Aggregate: AggregateRoot {
    type Command: Clone + core::fmt::Debug;
    type Event: Clone + core::fmt::Debug;
    type Error: core::fmt::Debug;

    /// Fold one event into state. Must be infallible and bump `version()` by one.
    fn apply(&mut self, event: &Self::Event);

    /// Validate `command` against current state and describe the outcome as
    /// events. Rejections leave the aggregate untouched.
    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error>;

    /// Apply a recorded event sequence in order.
    fn replay<'a, I>(&mut self, events: I)
    where
        I: IntoIterator<Item = &'a Self::Event>,
        Self::Event: 'a,
    {
        for event in events {
            self.apply(event);
        }
    }
}
