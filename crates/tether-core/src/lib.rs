//! tether-core
//!
//! Building blocks for bridging a native one-shot asynchronous task
//! (an opaque handle that completes exactly once with a value or a failure)
//! into a callback-based model, with exactly-once release of the native
//! resources behind it.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, failure, errors）
//! - **ports**: 抽象化レイヤー（NativeTask, EventSink）
//! - **listener / handle / adapter**: コア（ListenerProxy, TaskHandle, TaskAdapter）
//! - **impls**: 実装（InMemoryTask など開発・テスト用）
//! - **diagnostics**: 環境診断（logging only）

pub mod adapter;
pub mod diagnostics;
pub mod domain;
pub mod handle;
pub mod impls;
pub mod listener;
pub mod ports;

pub use adapter::TaskAdapter;
pub use domain::{AdapterError, Failure};
pub use handle::TaskHandle;
pub use listener::{FailureProxy, SuccessProxy};

/// Lock a mutex, recovering the guard if a previous holder panicked.
///
/// Listener lists stay consistent across a callback panic because delivery
/// drains them before invoking anything, so continuing is always safe here.
pub(crate) fn lock_or_recover<T>(
    mutex: &std::sync::Mutex<T>,
) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}
