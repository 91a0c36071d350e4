//! Request count and latency per operation.
//!
//! Exactly one observation is recorded per call. The observation is taken by
//! a guard that fires on drop, so a call whose future is dropped mid-flight or
//! whose inner service panics is still recorded (as `error="true"`).

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use unitsvc_auth::CallContext;
use unitsvc_core::{ClassId, ServiceResult, Unit, UnitId};
use unitsvc_observability::metrics::{CounterVec, DEFAULT_BUCKETS, HistogramVec, MetricsRegistry};

use crate::service::{Method, UnitService};

pub const REQUEST_COUNT: &str = "request_count";
pub const REQUEST_LATENCY: &str = "request_latency_seconds";

/// The two metric families recorded for every call, labelled by `method`
/// and `error`.
#[derive(Debug, Clone)]
pub struct RequestMetrics {
    count: Arc<CounterVec>,
    latency: Arc<HistogramVec>,
}

impl RequestMetrics {
    pub fn register(registry: &MetricsRegistry) -> Self {
        Self {
            count: registry.counter(REQUEST_COUNT, "Number of requests received."),
            latency: registry.histogram(
                REQUEST_LATENCY,
                "Total duration of requests in seconds.",
                DEFAULT_BUCKETS,
            ),
        }
    }

    fn observe(&self, method: Method, failed: bool, seconds: f64) {
        let labels = [
            ("method", method.as_str()),
            ("error", if failed { "true" } else { "false" }),
        ];
        self.count.inc(&labels);
        self.latency.observe(&labels, seconds);
    }

    pub fn count(&self, method: Method, failed: bool) -> u64 {
        let labels = [
            ("method", method.as_str()),
            ("error", if failed { "true" } else { "false" }),
        ];
        self.count.get(&labels) as u64
    }

    /// Observations across all methods and outcomes.
    pub fn total(&self) -> u64 {
        self.latency.total_count()
    }
}

struct Observation<'a> {
    metrics: &'a RequestMetrics,
    method: Method,
    started: Instant,
    succeeded: bool,
}

impl<'a> Observation<'a> {
    fn start(metrics: &'a RequestMetrics, method: Method) -> Self {
        Self {
            metrics,
            method,
            started: Instant::now(),
            succeeded: false,
        }
    }

    fn finish<T>(mut self, result: ServiceResult<T>) -> ServiceResult<T> {
        self.succeeded = result.is_ok();
        result
    }
}

impl Drop for Observation<'_> {
    fn drop(&mut self) {
        self.metrics
            .observe(self.method, !self.succeeded, self.started.elapsed().as_secs_f64());
    }
}

pub struct Instrumenting<N> {
    next: N,
    metrics: RequestMetrics,
}

impl<N> Instrumenting<N> {
    pub fn new(next: N, metrics: RequestMetrics) -> Self {
        Self { next, metrics }
    }

    pub fn metrics(&self) -> &RequestMetrics {
        &self.metrics
    }
}

#[async_trait]
impl<N> UnitService for Instrumenting<N>
where
    N: UnitService,
{
    async fn list_units(&self, ctx: &CallContext, class_id: ClassId) -> ServiceResult<Vec<UnitId>> {
        let observation = Observation::start(&self.metrics, Method::ListUnits);
        observation.finish(self.next.list_units(ctx, class_id).await)
    }

    async fn get_unit(&self, ctx: &CallContext, unit_id: UnitId) -> ServiceResult<Unit> {
        let observation = Observation::start(&self.metrics, Method::GetUnit);
        observation.finish(self.next.get_unit(ctx, unit_id).await)
    }

    async fn create_unit(&self, ctx: &CallContext, class_id: ClassId, title: &str) -> ServiceResult<()> {
        let observation = Observation::start(&self.metrics, Method::CreateUnit);
        observation.finish(self.next.create_unit(ctx, class_id, title).await)
    }

    async fn rename_unit(&self, ctx: &CallContext, unit_id: UnitId, title: &str) -> ServiceResult<()> {
        let observation = Observation::start(&self.metrics, Method::RenameUnit);
        observation.finish(self.next.rename_unit(ctx, unit_id, title).await)
    }

    async fn delete_unit(&self, ctx: &CallContext, unit_id: UnitId) -> ServiceResult<()> {
        let observation = Observation::start(&self.metrics, Method::DeleteUnit);
        observation.finish(self.next.delete_unit(ctx, unit_id).await)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use unitsvc_core::ServiceError;

    use super::*;
    use crate::testing::{Behaviour, Stub, ctx};

    fn instrumented(behaviour: Behaviour) -> (Arc<Instrumenting<Stub>>, MetricsRegistry) {
        let registry = MetricsRegistry::new("unitsvc");
        let metrics = RequestMetrics::register(&registry);
        (Arc::new(Instrumenting::new(Stub::new(behaviour), metrics)), registry)
    }

    #[tokio::test]
    async fn records_one_observation_per_successful_call() {
        let (svc, registry) = instrumented(Behaviour::Succeed);

        svc.list_units(&ctx(), ClassId::new()).await.unwrap();
        svc.get_unit(&ctx(), UnitId::new()).await.unwrap();
        svc.create_unit(&ctx(), ClassId::new(), "t").await.unwrap();

        let metrics = svc.metrics();
        assert_eq!(metrics.count(Method::ListUnits, false), 1);
        assert_eq!(metrics.count(Method::GetUnit, false), 1);
        assert_eq!(metrics.count(Method::CreateUnit, false), 1);
        assert_eq!(metrics.total(), 3);

        let text = registry.render();
        assert!(text.contains("unitsvc_request_count{method=\"GetUnit\",error=\"false\"} 1"));
        assert!(text.contains("unitsvc_request_latency_seconds_count{method=\"GetUnit\",error=\"false\"} 1"));
    }

    #[tokio::test]
    async fn errors_are_labelled_and_returned_unchanged() {
        let registry = MetricsRegistry::new("unitsvc");
        let metrics = RequestMetrics::register(&registry);
        let svc = Instrumenting::new(
            Stub::failing_with(Behaviour::Fail, ServiceError::internal("db down")),
            metrics,
        );

        let err = svc.delete_unit(&ctx(), UnitId::new()).await.unwrap_err();
        assert_eq!(err, ServiceError::internal("db down"));
        assert_eq!(svc.metrics().count(Method::DeleteUnit, true), 1);
        assert_eq!(svc.metrics().count(Method::DeleteUnit, false), 0);
    }

    #[tokio::test]
    async fn dropped_call_is_recorded_as_error() {
        let (svc, _registry) = instrumented(Behaviour::Hang);

        let outcome = tokio::time::timeout(Duration::from_millis(20), svc.rename_unit(&ctx(), UnitId::new(), "t")).await;
        assert!(outcome.is_err());

        assert_eq!(svc.metrics().count(Method::RenameUnit, true), 1);
        assert_eq!(svc.metrics().total(), 1);
    }

    #[tokio::test]
    async fn panicking_call_is_recorded_as_error() {
        let (svc, _registry) = instrumented(Behaviour::Panic);

        let task = {
            let svc = svc.clone();
            tokio::spawn(async move { svc.get_unit(&ctx(), UnitId::new()).await })
        };
        assert!(task.await.unwrap_err().is_panic());

        assert_eq!(svc.metrics().count(Method::GetUnit, true), 1);
        assert_eq!(svc.metrics().total(), 1);
    }
}
