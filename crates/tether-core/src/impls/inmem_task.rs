//! In-memory native task implementation.
//!
//! A fake foreign runtime for development and tests: it keeps the registered
//! proxies keyed by proxy identity, completes exactly once via
//! [`InMemoryTask::resolve`] / [`InMemoryTask::reject`], and can deliver the
//! completion later from a spawned task to simulate a scheduling context the
//! caller does not control.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::domain::{Failure, ProxyId, TaskId};
use crate::listener::{FailureProxy, SuccessProxy};
use crate::lock_or_recover;
use crate::ports::{AttachError, AttachTicket, NativeTask};

/// One-shot completion slot.
#[derive(Debug, Clone)]
enum Completion<T> {
    Resolved(T),
    Rejected(Failure),
}

struct TaskState<T> {
    /// Registered success proxies, in registration order.
    success: Vec<(ProxyId, Arc<SuccessProxy<T>>)>,
    /// Registered failure proxies, in registration order.
    failure: Vec<(ProxyId, Arc<FailureProxy>)>,
    completion: Option<Completion<T>>,
    released: bool,
}

pub struct InMemoryTask<T> {
    id: TaskId,
    state: Mutex<TaskState<T>>,
    release_calls: AtomicUsize,
    tickets_dropped: Arc<AtomicUsize>,
}

impl<T> Default for InMemoryTask<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> InMemoryTask<T> {
    pub fn new() -> Self {
        Self {
            id: TaskId::generate(),
            state: Mutex::new(TaskState {
                success: Vec::new(),
                failure: Vec::new(),
                completion: None,
                released: false,
            }),
            release_calls: AtomicUsize::new(0),
            tickets_dropped: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    /// How many times `release` reached this runtime. The handle guards
    /// idempotence, so through an adapter this stays at 1.
    pub fn release_calls(&self) -> usize {
        self.release_calls.load(Ordering::SeqCst)
    }

    /// How many attach transients have been freed so far.
    pub fn tickets_dropped(&self) -> usize {
        self.tickets_dropped.load(Ordering::SeqCst)
    }

    pub fn success_listeners(&self) -> usize {
        lock_or_recover(&self.state).success.len()
    }

    pub fn failure_listeners(&self) -> usize {
        lock_or_recover(&self.state).failure.len()
    }

    /// Each attach call produces a transient the caller must release; the
    /// counter observes that the handle really drops it within the call.
    fn ticket(&self) -> AttachTicket {
        let counter = Arc::clone(&self.tickets_dropped);
        AttachTicket::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }
}

impl<T: Clone + Send + Sync + 'static> InMemoryTask<T> {
    /// Complete the task successfully. Only the first completion wins;
    /// later calls are ignored (the native operation completes exactly once).
    pub fn resolve(&self, value: T) {
        let drained = {
            let mut state = lock_or_recover(&self.state);
            if state.completion.is_some() || state.released {
                return;
            }
            state.completion = Some(Completion::Resolved(value.clone()));
            std::mem::take(&mut state.success)
        };

        // Deliver outside the lock: callbacks may re-enter (attach, release).
        for (_id, proxy) in drained {
            proxy.deliver(&value);
        }
    }

    /// Complete the task with a failure.
    pub fn reject(&self, message: impl Into<String>, code: i32) {
        let failure = Failure::new(message, code);
        let drained = {
            let mut state = lock_or_recover(&self.state);
            if state.completion.is_some() || state.released {
                return;
            }
            state.completion = Some(Completion::Rejected(failure.clone()));
            std::mem::take(&mut state.failure)
        };

        for (_id, proxy) in drained {
            proxy.deliver(&failure.message, failure.code);
        }
    }

    /// Resolve after `delay`, from a spawned task.
    pub fn resolve_after(self: &Arc<Self>, delay: Duration, value: T) -> JoinHandle<()> {
        let task = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.resolve(value);
        })
    }

    /// Reject after `delay`, from a spawned task.
    pub fn reject_after(
        self: &Arc<Self>,
        delay: Duration,
        message: impl Into<String> + Send + 'static,
        code: i32,
    ) -> JoinHandle<()> {
        let task = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.reject(message, code);
        })
    }
}

impl<T: Clone + Send + Sync + 'static> NativeTask<T> for InMemoryTask<T> {
    fn attach_success_listener(
        &self,
        proxy: Arc<SuccessProxy<T>>,
    ) -> Result<AttachTicket, AttachError> {
        let pending = {
            let mut state = lock_or_recover(&self.state);
            if state.released {
                return Err(AttachError::Released);
            }
            match &state.completion {
                None => {
                    state.success.push((proxy.id(), Arc::clone(&proxy)));
                    None
                }
                // Late attach: the task already resolved, deliver immediately.
                Some(Completion::Resolved(value)) => Some(value.clone()),
                // Task failed; a success listener will never fire.
                Some(Completion::Rejected(_)) => None,
            }
        };

        if let Some(value) = pending {
            proxy.deliver(&value);
        }
        Ok(self.ticket())
    }

    fn attach_failure_listener(
        &self,
        proxy: Arc<FailureProxy>,
    ) -> Result<AttachTicket, AttachError> {
        let pending = {
            let mut state = lock_or_recover(&self.state);
            if state.released {
                return Err(AttachError::Released);
            }
            match &state.completion {
                None => {
                    state.failure.push((proxy.id(), Arc::clone(&proxy)));
                    None
                }
                Some(Completion::Rejected(failure)) => Some(failure.clone()),
                Some(Completion::Resolved(_)) => None,
            }
        };

        if let Some(failure) = pending {
            proxy.deliver(&failure.message, failure.code);
        }
        Ok(self.ticket())
    }

    fn release(&self) {
        self.release_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = lock_or_recover(&self.state);
        state.released = true;
        state.success.clear();
        state.failure.clear();
    }

    fn descriptor(&self) -> String {
        format!("inmem:{}", self.id)
    }
}
