//! Service wiring: picks a real or in-memory implementation for every
//! collaborator and assembles the unit service chain.

use std::sync::Arc;

use thiserror::Error;

use unitsvc_auth::{Introspector, MembershipAuthority, StaticIntrospector, StaticMembership};
use unitsvc_events::{EventBus, InMemoryEventBus, Notification, Subscription};
use unitsvc_infra::{
    config::Config,
    db::{self, ConnectError},
    event_bus::{RedisBusError, RedisPubSubEventBus},
    external::{ClientError, HttpIntrospector, HttpMembershipAuthority},
    store::{InMemoryUnitStore, PostgresUnitStore, UnitStore},
};
use unitsvc_observability::MetricsRegistry;
use unitsvc_service::{RequestMetrics, UnitService, build_pipeline};

/// Namespace for every metric this process exports.
pub const METRICS_NAMESPACE: &str = "unitsvc";

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Database(#[from] ConnectError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Redis(#[from] RedisBusError),
}

#[derive(Debug, Error)]
#[error("{0}")]
pub struct SinkError(String);

/// The notification sink selected at startup.
#[derive(Debug, Clone)]
pub enum NotificationSink {
    InMemory(Arc<InMemoryEventBus<Notification>>),
    Redis(RedisPubSubEventBus),
}

impl EventBus<Notification> for NotificationSink {
    type Error = SinkError;

    fn publish(&self, message: Notification) -> Result<(), Self::Error> {
        match self {
            NotificationSink::InMemory(bus) => bus.publish(message).map_err(|e| SinkError(e.to_string())),
            NotificationSink::Redis(bus) => bus.publish(message).map_err(|e| SinkError(e.to_string())),
        }
    }

    fn subscribe(&self) -> Subscription<Notification> {
        match self {
            NotificationSink::InMemory(bus) => bus.subscribe(),
            NotificationSink::Redis(bus) => bus.subscribe(),
        }
    }
}

/// Everything the HTTP layer needs, shared by all requests.
pub struct AppServices {
    pub units: Arc<dyn UnitService>,
    pub introspector: Arc<dyn Introspector>,
    pub metrics: Arc<MetricsRegistry>,
}

/// Handles onto the in-memory collaborators, for tests and local runs.
#[derive(Clone)]
pub struct InMemoryHandles {
    pub introspector: Arc<StaticIntrospector>,
    pub membership: Arc<StaticMembership>,
    pub store: Arc<InMemoryUnitStore>,
    pub bus: Arc<InMemoryEventBus<Notification>>,
}

impl AppServices {
    fn assemble(
        store: Arc<dyn UnitStore>,
        membership: Arc<dyn MembershipAuthority>,
        introspector: Arc<dyn Introspector>,
        sink: NotificationSink,
    ) -> Self {
        let metrics = Arc::new(MetricsRegistry::new(METRICS_NAMESPACE));
        let request_metrics = RequestMetrics::register(&metrics);
        let units = build_pipeline(store, membership, Arc::new(sink), request_metrics);

        Self {
            units: Arc::new(units),
            introspector,
            metrics,
        }
    }

    /// Fully in-memory wiring.
    pub fn in_memory() -> (Self, InMemoryHandles) {
        let handles = InMemoryHandles {
            introspector: Arc::new(StaticIntrospector::new()),
            membership: Arc::new(StaticMembership::new()),
            store: Arc::new(InMemoryUnitStore::new()),
            bus: Arc::new(InMemoryEventBus::new()),
        };

        let services = Self::assemble(
            handles.store.clone(),
            handles.membership.clone(),
            handles.introspector.clone(),
            NotificationSink::InMemory(handles.bus.clone()),
        );
        (services, handles)
    }
}

/// Build services from configuration.
///
/// Fails when the database stays unreachable through the startup retries or a
/// collaborator endpoint cannot be set up.
pub async fn build_services(config: &Config) -> Result<AppServices, StartupError> {
    let store: Arc<dyn UnitStore> = match &config.database_url {
        Some(url) => {
            let pool = db::connect_with_retry(url, db::CONNECT_ATTEMPTS, db::CONNECT_BACKOFF).await?;
            Arc::new(PostgresUnitStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; units are kept in memory");
            Arc::new(InMemoryUnitStore::new())
        }
    };

    let membership: Arc<dyn MembershipAuthority> = match &config.classsvc_url {
        Some(url) => Arc::new(HttpMembershipAuthority::new(url, config.http_timeout)?),
        None => {
            tracing::warn!("CLASSSVC_URL not set; using an empty in-memory membership table");
            Arc::new(StaticMembership::new())
        }
    };

    let introspector: Arc<dyn Introspector> = match &config.hydra {
        Some(hydra) => Arc::new(HttpIntrospector::new(hydra, config.http_timeout)?),
        None => {
            tracing::warn!("HYDRA_CLUSTER_URL not set; every bearer token will be rejected");
            Arc::new(StaticIntrospector::new())
        }
    };

    let sink = match &config.redis_url {
        Some(url) => NotificationSink::Redis(RedisPubSubEventBus::new(url)?),
        None => {
            tracing::warn!("REDIS_URL not set; notifications stay in process");
            NotificationSink::InMemory(Arc::new(InMemoryEventBus::new()))
        }
    };

    Ok(AppServices::assemble(store, membership, introspector, sink))
}
