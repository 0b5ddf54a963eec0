use skuforge_core::AggregateId;

/// Intent addressed to one aggregate, e.g. "vary this product by Color".
///
/// Commands own their data so a caller can hold on to them and resend after a
/// rejection.
pub trait Command: Clone + core::fmt::Debug + Send + Sync + 'static {
    fn target_aggregate_id(&self) -> AggregateId;
}
