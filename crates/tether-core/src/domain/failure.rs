//! Failure payload: the "failure" outcome of a native task.
//!
//! A task failing is not a fault of the adapter. It is the expected failure
//! outcome, delivered to failure callbacks as data (a human-readable message
//! plus a numeric code), never as a thrown error.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What the native runtime reports when a task completes unsuccessfully.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub message: String,
    pub code: i32,
}

impl Failure {
    pub fn new(message: impl Into<String>, code: i32) -> Self {
        Self {
            message: message.into(),
            code,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "code={}: {}", self.code, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_code_and_message() {
        let failure = Failure::new("network unreachable", 7);
        assert_eq!(failure.to_string(), "code=7: network unreachable");
    }

    #[test]
    fn failure_roundtrip_json() {
        let failure = Failure::new("quota exceeded", 429);
        let s = serde_json::to_string(&failure).unwrap();
        let back: Failure = serde_json::from_str(&s).unwrap();
        assert_eq!(back, failure);
    }
}
