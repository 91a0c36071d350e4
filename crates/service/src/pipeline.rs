//! Fixed-order composition of the decorator chain.

use std::sync::Arc;

use unitsvc_auth::MembershipAuthority;
use unitsvc_events::{EventBus, Notification};
use unitsvc_infra::store::UnitStore;

use crate::{Instrumenting, Logging, Notifying, RequestMetrics, UnitCore};

/// `Logging(Instrumenting(Notifying(UnitCore)))`.
pub type UnitPipeline<S, M, B> = Logging<Instrumenting<Notifying<UnitCore<S, M>, B>>>;

/// Assemble the service chain once at startup.
pub fn build_pipeline<S, M, B>(
    store: S,
    membership: M,
    bus: Arc<B>,
    metrics: RequestMetrics,
) -> UnitPipeline<S, M, B>
where
    S: UnitStore,
    M: MembershipAuthority,
    B: EventBus<Notification> + ?Sized + 'static,
{
    let core = UnitCore::new(store, membership);
    let notifying = Notifying::new(core, bus);
    let instrumenting = Instrumenting::new(notifying, metrics);
    Logging::new(instrumenting)
}
