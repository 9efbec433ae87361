//! TaskAdapter - the public surface.
//!
//! Wraps exactly one native task and offers `on_success` / `on_failure` /
//! `release`. Each registration creates a fresh [`SuccessProxy`] /
//! [`FailureProxy`] and hands it to the runtime; there is no coalescing, so
//! N registrations are N independent listeners. There is no cancellation:
//! once in flight, a task cannot be asked to stop, only the local wrapper can
//! be torn down.

use std::sync::Arc;

use crate::domain::AdapterError;
use crate::handle::TaskHandle;
use crate::listener::{FailureProxy, SuccessProxy};
use crate::ports::{EventSink, NativeTask, TracingSink};

pub struct TaskAdapter<T> {
    handle: TaskHandle<T>,
}

impl<T> TaskAdapter<T> {
    /// Take exclusive ownership of `native`, logging diagnostics via
    /// [`TracingSink`].
    ///
    /// Fails fast with [`AdapterError::NullTask`] when the task-producing
    /// system handed us nothing.
    pub fn new(native: Option<Arc<dyn NativeTask<T>>>) -> Result<Self, AdapterError> {
        Self::with_sink(native, Arc::new(TracingSink))
    }

    /// Same as [`TaskAdapter::new`] with an explicit diagnostic sink.
    pub fn with_sink(
        native: Option<Arc<dyn NativeTask<T>>>,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, AdapterError> {
        let native = native.ok_or(AdapterError::NullTask)?;
        Ok(Self {
            handle: TaskHandle::new(native, sink),
        })
    }

    /// Register a callback for successful completion.
    ///
    /// The callback is invoked at most once, with the resolved value, on
    /// whatever context the runtime delivers completion from. If the task
    /// already resolved, delivery happens immediately. Registration is
    /// best-effort: a runtime-side rejection is logged, not returned.
    pub fn on_success(&self, callback: impl Fn(&T) + Send + Sync + 'static) {
        let proxy = Arc::new(SuccessProxy::new(self.handle.sink()));
        proxy.subscribe(callback);
        self.handle.attach_success(proxy);
    }

    /// Register a callback for failed completion. The callback receives a
    /// human-readable message and a numeric error code.
    pub fn on_failure(&self, callback: impl Fn(&str, i32) + Send + Sync + 'static) {
        let proxy = Arc::new(FailureProxy::new(self.handle.sink()));
        proxy.subscribe(callback);
        self.handle.attach_failure(proxy);
    }

    /// Free the native handle. Idempotent; also invoked on drop.
    ///
    /// Proxies already handed to the runtime are independently owned and hold
    /// no reference back here, so one may still fire if the runtime delivers
    /// completion concurrently with release. That is safe; it just means a
    /// callback can run after `release()` returned.
    pub fn release(&self) {
        self.handle.release();
    }

    pub fn is_released(&self) -> bool {
        self.handle.is_released()
    }
}

impl<T> Drop for TaskAdapter<T> {
    fn drop(&mut self) {
        self.handle.release();
    }
}
