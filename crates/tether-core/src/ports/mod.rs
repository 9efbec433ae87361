//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! - `NativeTask`: 外部ランタイム（native な非同期タスク）への registration
//!   primitives とその release
//! - `EventSink`: 握りつぶしたエラーを観測可能にする診断イベントの記録先

pub mod event_sink;
pub mod native_task;

pub use self::event_sink::{
    DiagnosticEvent, DiagnosticKind, EventSink, NoopSink, RecordingSink, TracingSink,
};
pub use self::native_task::{AttachError, AttachTicket, NativeTask};
