//! TaskHandle - exclusive owner of one native asynchronous reference.
//!
//! The handle is where the error policy of the registration boundary lives:
//! - attach faults from the runtime are caught, recorded, and swallowed
//!   (best-effort registration; the caller's call returns normally),
//! - use after release is recorded and ignored,
//! - the native reference is freed exactly once no matter how many times
//!   release is requested.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::listener::{FailureProxy, SuccessProxy};
use crate::ports::{DiagnosticEvent, DiagnosticKind, EventSink, NativeTask};

pub struct TaskHandle<T> {
    native: Arc<dyn NativeTask<T>>,
    released: AtomicBool,
    sink: Arc<dyn EventSink>,
}

impl<T> TaskHandle<T> {
    pub fn new(native: Arc<dyn NativeTask<T>>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            native,
            released: AtomicBool::new(false),
            sink,
        }
    }

    pub fn sink(&self) -> Arc<dyn EventSink> {
        Arc::clone(&self.sink)
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    /// Register a success proxy with the runtime.
    ///
    /// The transient ticket an attach call may produce is dropped right here,
    /// inside the call scope, never retained.
    pub fn attach_success(&self, proxy: Arc<SuccessProxy<T>>) {
        if self.is_released() {
            self.record_post_release_use("success");
            return;
        }
        let proxy_id = proxy.id();
        match self.native.attach_success_listener(proxy) {
            Ok(_ticket) => {}
            Err(err) => self.record_attach_rejected("success", proxy_id.to_string(), &err),
        }
    }

    /// Symmetric, for a failure proxy.
    pub fn attach_failure(&self, proxy: Arc<FailureProxy>) {
        if self.is_released() {
            self.record_post_release_use("failure");
            return;
        }
        let proxy_id = proxy.id();
        match self.native.attach_failure_listener(proxy) {
            Ok(_ticket) => {}
            Err(err) => self.record_attach_rejected("failure", proxy_id.to_string(), &err),
        }
    }

    /// Free the native reference. Idempotent; only the first call reaches the
    /// runtime.
    pub fn release(&self) {
        if self.released.swap(true, Ordering::SeqCst) {
            return;
        }
        self.native.release();
        self.sink.record(DiagnosticEvent::now(
            DiagnosticKind::Released,
            serde_json::json!({ "task": self.native.descriptor() }),
        ));
    }

    fn record_post_release_use(&self, variant: &str) {
        self.sink.record(DiagnosticEvent::now(
            DiagnosticKind::PostReleaseUse,
            serde_json::json!({
                "task": self.native.descriptor(),
                "variant": variant,
            }),
        ));
    }

    fn record_attach_rejected(
        &self,
        variant: &str,
        proxy_id: String,
        err: &crate::ports::AttachError,
    ) {
        self.sink.record(DiagnosticEvent::now(
            DiagnosticKind::AttachRejected,
            serde_json::json!({
                "task": self.native.descriptor(),
                "variant": variant,
                "proxy": proxy_id,
                "error": err.to_string(),
            }),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::InMemoryTask;
    use crate::ports::{AttachError, AttachTicket, RecordingSink};

    /// A runtime that refuses every registration.
    struct RejectingTask;

    impl NativeTask<i32> for RejectingTask {
        fn attach_success_listener(
            &self,
            _proxy: Arc<SuccessProxy<i32>>,
        ) -> Result<AttachTicket, AttachError> {
            Err(AttachError::Rejected("no listener slots".to_string()))
        }

        fn attach_failure_listener(
            &self,
            _proxy: Arc<FailureProxy>,
        ) -> Result<AttachTicket, AttachError> {
            Err(AttachError::Rejected("no listener slots".to_string()))
        }

        fn release(&self) {}
    }

    fn handle_over<T>(
        native: Arc<dyn NativeTask<T>>,
    ) -> (TaskHandle<T>, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::new());
        let handle = TaskHandle::new(native, Arc::clone(&sink) as Arc<dyn EventSink>);
        (handle, sink)
    }

    #[test]
    fn attach_rejection_is_swallowed_and_recorded() {
        let (handle, sink) = handle_over(Arc::new(RejectingTask) as Arc<dyn NativeTask<i32>>);
        let proxy = Arc::new(SuccessProxy::<i32>::new(handle.sink()));

        // Does not propagate; the caller is only told via the sink.
        handle.attach_success(proxy);

        assert_eq!(sink.kinds(), vec![DiagnosticKind::AttachRejected]);
        let event = &sink.events()[0];
        assert_eq!(event.context["variant"], "success");
        assert!(
            event.context["error"]
                .as_str()
                .unwrap()
                .contains("no listener slots")
        );
    }

    #[test]
    fn attach_ticket_is_released_within_the_call() {
        let task = Arc::new(InMemoryTask::<i32>::new());
        let (handle, _sink) = handle_over(Arc::clone(&task) as Arc<dyn NativeTask<i32>>);

        let proxy = Arc::new(SuccessProxy::new(handle.sink()));
        handle.attach_success(proxy);

        // Listener stays registered, but the transient is already freed.
        assert_eq!(task.success_listeners(), 1);
        assert_eq!(task.tickets_dropped(), 1);
    }

    #[test]
    fn release_reaches_the_runtime_exactly_once() {
        let task = Arc::new(InMemoryTask::<i32>::new());
        let (handle, sink) = handle_over(Arc::clone(&task) as Arc<dyn NativeTask<i32>>);

        handle.release();
        handle.release();
        handle.release();

        assert_eq!(task.release_calls(), 1);
        assert_eq!(sink.kinds(), vec![DiagnosticKind::Released]);
    }

    #[test]
    fn attach_after_release_is_recorded_noop() {
        let task = Arc::new(InMemoryTask::<i32>::new());
        let (handle, sink) = handle_over(Arc::clone(&task) as Arc<dyn NativeTask<i32>>);

        handle.release();
        handle.attach_failure(Arc::new(FailureProxy::new(handle.sink())));

        assert_eq!(task.failure_listeners(), 0);
        assert_eq!(
            sink.kinds(),
            vec![DiagnosticKind::Released, DiagnosticKind::PostReleaseUse]
        );
    }
}
