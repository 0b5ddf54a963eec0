use chrono::{DateTime, Utc};

/// A fact recorded by an aggregate after a command was accepted.
///
/// Replaying the same events against a fresh aggregate must rebuild the same
/// state, so events carry everything `apply` needs and nothing it must look up.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Dotted name, e.g. `"variants.dimension.added"`.
    fn event_type(&self) -> &'static str;

    /// Payload schema revision.
    fn version(&self) -> u32 {
        1
    }

    /// Business time, taken from the command that caused the event.
    fn occurred_at(&self) -> DateTime<Utc>;
}
