//! NativeTask port - the registration primitives the foreign runtime understands.
//!
//! The foreign runtime owns task completion. The only things it lets us do
//! are: register a success listener, register a failure listener, and free
//! the native reference. There is no cancellation primitive.

use std::sync::Arc;

use thiserror::Error;

use crate::listener::{FailureProxy, SuccessProxy};

/// Why the runtime refused to register a listener.
///
/// Never propagated past [`TaskHandle`](crate::handle::TaskHandle): attach
/// failures are an environment problem, not an application-logic problem,
/// and are surfaced via the event sink only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttachError {
    #[error("native task already released")]
    Released,

    #[error("runtime rejected listener registration: {0}")]
    Rejected(String),
}

/// Transient result object an attach call may produce on the native side.
///
/// Scoped acquisition: the hook runs exactly once, when the ticket is
/// dropped. The handle drops tickets immediately after each attach call, so
/// the transient is never held past the call that produced it.
pub struct AttachTicket {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl AttachTicket {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// For runtimes whose attach calls produce nothing to free.
    pub fn empty() -> Self {
        Self { release: None }
    }
}

impl Drop for AttachTicket {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl std::fmt::Debug for AttachTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttachTicket")
            .field("pending", &self.release.is_some())
            .finish()
    }
}

/// One in-flight native asynchronous operation.
///
/// Implementations are invoked synchronously from the registering thread for
/// attach/release, but deliver completion to proxies from their own
/// scheduling context. Exclusive ownership of the native reference stays with
/// one [`TaskHandle`](crate::handle::TaskHandle); idempotence of `release`
/// lives there, so an implementation may assume at most one call.
pub trait NativeTask<T>: Send + Sync {
    /// Register `proxy` on the runtime's success listener list.
    ///
    /// Side effect only: the proxy's entry point will be invoked once if/when
    /// the task completes successfully (immediately, if it already has).
    fn attach_success_listener(
        &self,
        proxy: Arc<SuccessProxy<T>>,
    ) -> Result<AttachTicket, AttachError>;

    /// Symmetric, for the failure listener list.
    fn attach_failure_listener(
        &self,
        proxy: Arc<FailureProxy>,
    ) -> Result<AttachTicket, AttachError>;

    /// Free the native reference. Called at most once.
    fn release(&self);

    /// Debug label for diagnostic events.
    fn descriptor(&self) -> String {
        "native-task".to_string()
    }
}
