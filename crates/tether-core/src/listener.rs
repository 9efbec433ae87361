//! ListenerProxy - single-fire fan-out dispatchers.
//!
//! One proxy is created per `on_success`/`on_failure` registration and handed
//! to the foreign runtime, which invokes its entry point from a scheduling
//! context the caller does not control. The proxy fans the result out to its
//! subscribed callbacks in subscription order, then becomes inert.
//!
//! A proxy holds no reference back to the adapter or the handle. Its lifetime
//! is decoupled: the runtime may keep it alive and fire it after the handle
//! was released, which is safe by construction.
//!
//! The one-shot latch is enforced here: a second invocation by a misbehaving
//! runtime is dropped and reported to the sink as `DuplicateFire`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::domain::ProxyId;
use crate::lock_or_recover;
use crate::ports::{DiagnosticEvent, DiagnosticKind, EventSink};

type SuccessCallback<T> = Box<dyn Fn(&T) + Send + Sync>;
type FailureCallback = Box<dyn Fn(&str, i32) + Send + Sync>;

/// Success variant: callbacks of shape `(T) -> ()`.
pub struct SuccessProxy<T> {
    id: ProxyId,
    callbacks: Mutex<Vec<SuccessCallback<T>>>,
    fired: AtomicBool,
    sink: Arc<dyn EventSink>,
}

impl<T> SuccessProxy<T> {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self {
            id: ProxyId::generate(),
            callbacks: Mutex::new(Vec::new()),
            fired: AtomicBool::new(false),
            sink,
        }
    }

    pub fn id(&self) -> ProxyId {
        self.id
    }

    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    /// Add a callback to this proxy's dispatch list. Subscription order is
    /// the invocation order. Subscribing after the proxy fired is allowed
    /// but the callback will never run (the proxy is inert).
    pub fn subscribe(&self, callback: impl Fn(&T) + Send + Sync + 'static) {
        lock_or_recover(&self.callbacks).push(Box::new(callback));
    }

    /// Runtime-invoked entry point for successful completion.
    ///
    /// Fires at most once. The callback list is drained on the first fire,
    /// which both frees the listener resources and keeps callbacks running
    /// outside the lock (a callback may subscribe or release re-entrantly).
    pub fn deliver(&self, value: &T) {
        if self.fired.swap(true, Ordering::SeqCst) {
            self.sink.record(DiagnosticEvent::now(
                DiagnosticKind::DuplicateFire,
                serde_json::json!({ "proxy": self.id.to_string(), "variant": "success" }),
            ));
            return;
        }

        let callbacks = std::mem::take(&mut *lock_or_recover(&self.callbacks));
        for callback in &callbacks {
            callback(value);
        }
    }
}

/// Failure variant: callbacks of shape `(message, code) -> ()`.
pub struct FailureProxy {
    id: ProxyId,
    callbacks: Mutex<Vec<FailureCallback>>,
    fired: AtomicBool,
    sink: Arc<dyn EventSink>,
}

impl FailureProxy {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self {
            id: ProxyId::generate(),
            callbacks: Mutex::new(Vec::new()),
            fired: AtomicBool::new(false),
            sink,
        }
    }

    pub fn id(&self) -> ProxyId {
        self.id
    }

    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    pub fn subscribe(&self, callback: impl Fn(&str, i32) + Send + Sync + 'static) {
        lock_or_recover(&self.callbacks).push(Box::new(callback));
    }

    /// Runtime-invoked entry point for failed completion.
    pub fn deliver(&self, message: &str, code: i32) {
        if self.fired.swap(true, Ordering::SeqCst) {
            self.sink.record(DiagnosticEvent::now(
                DiagnosticKind::DuplicateFire,
                serde_json::json!({ "proxy": self.id.to_string(), "variant": "failure" }),
            ));
            return;
        }

        let callbacks = std::mem::take(&mut *lock_or_recover(&self.callbacks));
        for callback in &callbacks {
            callback(message, code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::RecordingSink;
    use std::sync::Mutex;

    fn recording() -> (Arc<RecordingSink>, Arc<dyn EventSink>) {
        let sink = Arc::new(RecordingSink::new());
        (Arc::clone(&sink), sink as Arc<dyn EventSink>)
    }

    #[test]
    fn callbacks_fire_in_subscription_order() {
        let (_, sink) = recording();
        let proxy = SuccessProxy::<i32>::new(sink);
        let order = Arc::new(Mutex::new(Vec::new()));

        for tag in 1..=3 {
            let order = Arc::clone(&order);
            proxy.subscribe(move |_value| order.lock().unwrap().push(tag));
        }
        proxy.deliver(&42);

        assert_eq!(*order.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn second_fire_is_suppressed_and_reported() {
        let (recorder, sink) = recording();
        let proxy = SuccessProxy::<i32>::new(sink);
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink_seen = Arc::clone(&seen);
        proxy.subscribe(move |value| sink_seen.lock().unwrap().push(*value));

        proxy.deliver(&42);
        proxy.deliver(&42); // misbehaving runtime

        assert_eq!(*seen.lock().unwrap(), vec![42]);
        assert!(proxy.has_fired());
        assert_eq!(recorder.kinds(), vec![DiagnosticKind::DuplicateFire]);
    }

    #[test]
    fn failure_proxy_delivers_message_and_code() {
        let (_, sink) = recording();
        let proxy = FailureProxy::new(sink);
        let seen = Arc::new(Mutex::new(Vec::new()));

        let record = Arc::clone(&seen);
        proxy.subscribe(move |message, code| {
            record.lock().unwrap().push((message.to_string(), code));
        });
        proxy.deliver("network unreachable", 7);

        assert_eq!(
            *seen.lock().unwrap(),
            vec![("network unreachable".to_string(), 7)]
        );
    }

    #[test]
    fn subscribing_after_fire_never_runs() {
        let (recorder, sink) = recording();
        let proxy = SuccessProxy::<i32>::new(sink);
        proxy.deliver(&1);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let late = Arc::clone(&seen);
        proxy.subscribe(move |value| late.lock().unwrap().push(*value));
        proxy.deliver(&2);

        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(recorder.kinds(), vec![DiagnosticKind::DuplicateFire]);
    }

    #[test]
    fn reentrant_subscribe_from_a_callback_does_not_deadlock() {
        let (_, sink) = recording();
        let proxy = Arc::new(SuccessProxy::<i32>::new(sink));

        let inner = Arc::clone(&proxy);
        proxy.subscribe(move |_value| {
            // Delivery drained the list before invoking us, so this must not
            // block on the callback lock.
            inner.subscribe(|_value| {});
        });
        proxy.deliver(&42);
    }
}
