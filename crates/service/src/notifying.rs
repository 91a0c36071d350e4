//! Announces successful mutations on the event sink.
//!
//! The publish happens after the inner call returned `Ok`, on a blocking task
//! that is never joined: the caller's result does not depend on it and a
//! failed publish is only logged. Reads pass straight through.

use std::sync::Arc;

use async_trait::async_trait;

use unitsvc_auth::CallContext;
use unitsvc_core::{ClassId, ServiceResult, Unit, UnitId};
use unitsvc_events::{EventBus, Notification};

use crate::service::UnitService;

pub struct Notifying<N, B: ?Sized> {
    next: N,
    bus: Arc<B>,
}

impl<N, B> Notifying<N, B>
where
    B: EventBus<Notification> + ?Sized + 'static,
{
    pub fn new(next: N, bus: Arc<B>) -> Self {
        Self { next, bus }
    }

    fn publish(&self, notification: Notification) {
        let bus = Arc::clone(&self.bus);
        tokio::task::spawn_blocking(move || {
            let topic = notification.topic();
            let payload = notification.payload().to_string();
            if let Err(e) = bus.publish(notification) {
                tracing::warn!(topic = %topic, payload = %payload, error = %e, "failed to publish notification");
            }
        });
    }
}

#[async_trait]
impl<N, B> UnitService for Notifying<N, B>
where
    N: UnitService,
    B: EventBus<Notification> + ?Sized + 'static,
{
    async fn list_units(&self, ctx: &CallContext, class_id: ClassId) -> ServiceResult<Vec<UnitId>> {
        self.next.list_units(ctx, class_id).await
    }

    async fn get_unit(&self, ctx: &CallContext, unit_id: UnitId) -> ServiceResult<Unit> {
        self.next.get_unit(ctx, unit_id).await
    }

    async fn create_unit(&self, ctx: &CallContext, class_id: ClassId, title: &str) -> ServiceResult<()> {
        self.next.create_unit(ctx, class_id, title).await?;
        self.publish(Notification::unit_created(class_id));
        Ok(())
    }

    async fn rename_unit(&self, ctx: &CallContext, unit_id: UnitId, title: &str) -> ServiceResult<()> {
        self.next.rename_unit(ctx, unit_id, title).await?;
        self.publish(Notification::unit_renamed(unit_id));
        Ok(())
    }

    async fn delete_unit(&self, ctx: &CallContext, unit_id: UnitId) -> ServiceResult<()> {
        self.next.delete_unit(ctx, unit_id).await?;
        self.publish(Notification::unit_deleted(unit_id));
        Ok(())
    }
}
