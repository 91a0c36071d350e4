//! One structured log record per call.

use std::time::Instant;

use async_trait::async_trait;

use unitsvc_auth::CallContext;
use unitsvc_core::{ClassId, ServiceResult, Unit, UnitId};

use crate::service::{Method, UnitService};

// Successful calls log at info, failed ones at warn with the error text.
macro_rules! log_call {
    ($result:expr, $($field:tt)*) => {
        match $result {
            Ok(_) => tracing::info!($($field)*, error = "none"),
            Err(err) => tracing::warn!($($field)*, error = %err),
        }
    };
}

pub struct Logging<N> {
    next: N,
}

impl<N> Logging<N> {
    pub fn new(next: N) -> Self {
        Self { next }
    }

    pub fn inner(&self) -> &N {
        &self.next
    }
}

#[async_trait]
impl<N> UnitService for Logging<N>
where
    N: UnitService,
{
    async fn list_units(&self, ctx: &CallContext, class_id: ClassId) -> ServiceResult<Vec<UnitId>> {
        let started = Instant::now();
        let result = self.next.list_units(ctx, class_id).await;
        log_call!(
            &result,
            action = Method::ListUnits.as_str(),
            user = %ctx.subject(),
            client = ctx.client_id(),
            request_id = %ctx.trace().request_id(),
            class = %class_id,
            duration = ?started.elapsed()
        );
        result
    }

    async fn get_unit(&self, ctx: &CallContext, unit_id: UnitId) -> ServiceResult<Unit> {
        let started = Instant::now();
        let result = self.next.get_unit(ctx, unit_id).await;
        log_call!(
            &result,
            action = Method::GetUnit.as_str(),
            user = %ctx.subject(),
            client = ctx.client_id(),
            request_id = %ctx.trace().request_id(),
            unit = %unit_id,
            duration = ?started.elapsed()
        );
        result
    }

    async fn create_unit(&self, ctx: &CallContext, class_id: ClassId, title: &str) -> ServiceResult<()> {
        let started = Instant::now();
        let result = self.next.create_unit(ctx, class_id, title).await;
        log_call!(
            &result,
            action = Method::CreateUnit.as_str(),
            user = %ctx.subject(),
            client = ctx.client_id(),
            request_id = %ctx.trace().request_id(),
            class = %class_id,
            title = title,
            duration = ?started.elapsed()
        );
        result
    }

    async fn rename_unit(&self, ctx: &CallContext, unit_id: UnitId, title: &str) -> ServiceResult<()> {
        let started = Instant::now();
        let result = self.next.rename_unit(ctx, unit_id, title).await;
        log_call!(
            &result,
            action = Method::RenameUnit.as_str(),
            user = %ctx.subject(),
            client = ctx.client_id(),
            request_id = %ctx.trace().request_id(),
            unit = %unit_id,
            title = title,
            duration = ?started.elapsed()
        );
        result
    }

    async fn delete_unit(&self, ctx: &CallContext, unit_id: UnitId) -> ServiceResult<()> {
        let started = Instant::now();
        let result = self.next.delete_unit(ctx, unit_id).await;
        log_call!(
            &result,
            action = Method::DeleteUnit.as_str(),
            user = %ctx.subject(),
            client = ctx.client_id(),
            request_id = %ctx.trace().request_id(),
            unit = %unit_id,
            duration = ?started.elapsed()
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use serde_json::Value;
    use unitsvc_core::ServiceError;

    use super::*;
    use crate::testing::{Behaviour, Stub, ctx};

    /// Collects everything the JSON formatter writes.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn records(&self) -> Vec<Value> {
            let bytes = self.0.lock().unwrap().clone();
            String::from_utf8(bytes)
                .unwrap()
                .lines()
                .map(|line| serde_json::from_str(line).unwrap())
                .collect()
        }
    }

    fn capture() -> (Captured, tracing::subscriber::DefaultGuard) {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_writer(move || writer.clone())
            .finish();
        (captured, tracing::subscriber::set_default(subscriber))
    }

    #[tokio::test]
    async fn successful_call_emits_one_info_record() {
        let (captured, _guard) = capture();
        let svc = Logging::new(Stub::new(Behaviour::Succeed));
        let ctx = ctx();
        let class_id = ClassId::new();

        svc.create_unit(&ctx, class_id, "Lesson 1").await.unwrap();

        let records = captured.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["level"], "INFO");

        let fields = &records[0]["fields"];
        assert_eq!(fields["action"], "CreateUnit");
        assert_eq!(fields["user"], ctx.subject().to_string());
        assert_eq!(fields["client"], "web");
        assert_eq!(fields["request_id"], ctx.trace().request_id().to_string());
        assert_eq!(fields["class"], class_id.to_string());
        assert_eq!(fields["title"], "Lesson 1");
        assert_eq!(fields["error"], "none");
        assert!(fields["duration"].is_string());
        assert!(fields.get("unit").is_none());
    }

    #[tokio::test]
    async fn failed_call_emits_warn_with_error_text() {
        let (captured, _guard) = capture();
        let svc = Logging::new(Stub::failing_with(Behaviour::Fail, ServiceError::internal("boom")));
        let unit_id = UnitId::new();

        svc.rename_unit(&ctx(), unit_id, "Lesson 2").await.unwrap_err();

        let records = captured.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["level"], "WARN");

        let fields = &records[0]["fields"];
        assert_eq!(fields["action"], "RenameUnit");
        assert_eq!(fields["unit"], unit_id.to_string());
        assert_eq!(fields["title"], "Lesson 2");
        assert_eq!(fields["error"], ServiceError::internal("boom").to_string());
        assert!(fields.get("class").is_none());
    }

    #[tokio::test]
    async fn resource_field_follows_the_operation() {
        let (captured, _guard) = capture();
        let svc = Logging::new(Stub::new(Behaviour::Succeed));
        let class_id = ClassId::new();
        let unit_id = UnitId::new();

        svc.list_units(&ctx(), class_id).await.unwrap();
        svc.get_unit(&ctx(), unit_id).await.unwrap();
        svc.delete_unit(&ctx(), unit_id).await.unwrap();

        let records = captured.records();
        let actions: Vec<_> = records.iter().map(|r| r["fields"]["action"].clone()).collect();
        assert_eq!(actions, ["ListUnits", "GetUnit", "DeleteUnit"]);

        assert_eq!(records[0]["fields"]["class"], class_id.to_string());
        assert!(records[0]["fields"].get("unit").is_none());
        for record in &records[1..] {
            assert_eq!(record["fields"]["unit"], unit_id.to_string());
            assert!(record["fields"].get("class").is_none());
            assert!(record["fields"].get("title").is_none());
        }
    }

    #[tokio::test]
    async fn passes_results_through_untouched() {
        let svc = Logging::new(Stub::new(Behaviour::Succeed));
        let unit_id = UnitId::new();

        let unit = svc.get_unit(&ctx(), unit_id).await.unwrap();
        assert_eq!(*unitsvc_core::Entity::id(&unit), unit_id);
        svc.rename_unit(&ctx(), unit_id, "Lesson 2").await.unwrap();
        assert_eq!(svc.inner().calls(), 2);
    }

    #[tokio::test]
    async fn passes_errors_through_untouched() {
        let svc = Logging::new(Stub::failing_with(Behaviour::Fail, ServiceError::internal("boom")));

        assert_eq!(
            svc.create_unit(&ctx(), ClassId::new(), "t").await.unwrap_err(),
            ServiceError::internal("boom")
        );
        assert_eq!(
            svc.list_units(&ctx(), ClassId::new()).await.unwrap_err(),
            ServiceError::internal("boom")
        );
        assert_eq!(svc.inner().calls(), 2);
    }
}
