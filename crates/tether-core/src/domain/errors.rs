//! Caller-visible errors.
//!
//! Construction-time misuse is the only error surfaced to callers. Runtime
//! registration faults are caught at the handle boundary and reported through
//! the [`EventSink`](crate::ports::EventSink) instead, and task failure is
//! delivered as data through failure callbacks.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    /// The task-producing system handed us a null/unset native reference.
    #[error("native task reference is null/unset")]
    NullTask,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_task_message_names_the_problem() {
        let msg = AdapterError::NullTask.to_string();
        assert!(msg.contains("null"));
    }
}
