//! EventSink port - 診断イベント記録の抽象化
//!
//! Swallow-and-log はこの設計の明示的なポリシーです。registration の失敗や
//! release 後の誤用は呼び出し側へ伝播させず、ここを通して観測可能にします。
//!
//! # 実装
//! - `TracingSink`: デフォルト。`tracing` へ構造化ログとして出力
//! - `NoopSink`: 何もしない
//! - `RecordingSink`: テスト用（記録した順に保持）

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Mutex;

use crate::lock_or_recover;

/// What went sideways, from the adapter's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticKind {
    /// The runtime refused to register a listener; the caller was not told.
    AttachRejected,
    /// `on_success`/`on_failure` after `release()`; treated as a no-op.
    PostReleaseUse,
    /// A proxy was invoked a second time by a misbehaving runtime.
    DuplicateFire,
    /// The native reference was freed.
    Released,
}

/// One recorded diagnostic, with free-form JSON context.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticEvent {
    pub at: DateTime<Utc>,
    pub kind: DiagnosticKind,
    pub context: serde_json::Value,
}

impl DiagnosticEvent {
    pub fn now(kind: DiagnosticKind, context: serde_json::Value) -> Self {
        Self {
            at: Utc::now(),
            kind,
            context,
        }
    }
}

/// EventSink はアダプタ内部で発生した診断イベントを記録する
pub trait EventSink: Send + Sync {
    fn record(&self, event: DiagnosticEvent);
}

/// Drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn record(&self, _event: DiagnosticEvent) {}
}

/// Default sink: structured logging via `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, event: DiagnosticEvent) {
        match event.kind {
            DiagnosticKind::AttachRejected => {
                tracing::warn!(context = %event.context, "listener registration rejected by runtime");
            }
            DiagnosticKind::PostReleaseUse => {
                tracing::error!(context = %event.context, "listener registered after release; ignored");
            }
            DiagnosticKind::DuplicateFire => {
                tracing::warn!(context = %event.context, "proxy fired more than once; extra delivery dropped");
            }
            DiagnosticKind::Released => {
                tracing::debug!(context = %event.context, "native task released");
            }
        }
    }
}

/// Test double keeping events in arrival order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<DiagnosticEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DiagnosticEvent> {
        lock_or_recover(&self.events).clone()
    }

    pub fn kinds(&self) -> Vec<DiagnosticKind> {
        lock_or_recover(&self.events)
            .iter()
            .map(|event| event.kind)
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn record(&self, event: DiagnosticEvent) {
        lock_or_recover(&self.events).push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_serializes_as_screaming_snake_case() {
        let s = serde_json::to_string(&DiagnosticKind::AttachRejected).unwrap();
        assert_eq!(s, "\"ATTACH_REJECTED\"");

        let s = serde_json::to_string(&DiagnosticKind::PostReleaseUse).unwrap();
        assert_eq!(s, "\"POST_RELEASE_USE\"");
    }

    #[test]
    fn recording_sink_keeps_arrival_order() {
        let sink = RecordingSink::new();
        sink.record(DiagnosticEvent::now(
            DiagnosticKind::Released,
            serde_json::json!({}),
        ));
        sink.record(DiagnosticEvent::now(
            DiagnosticKind::PostReleaseUse,
            serde_json::json!({"variant": "success"}),
        ));

        assert_eq!(
            sink.kinds(),
            vec![DiagnosticKind::Released, DiagnosticKind::PostReleaseUse]
        );
    }

    #[test]
    fn tracing_sink_records_without_panicking() {
        let sink = TracingSink;
        sink.record(DiagnosticEvent::now(
            DiagnosticKind::DuplicateFire,
            serde_json::json!({"proxy": "proxy-x"}),
        ));
    }
}
