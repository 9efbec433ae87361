//! Implementations - 開発・テスト用

pub mod inmem_task;

pub use self::inmem_task::InMemoryTask;
