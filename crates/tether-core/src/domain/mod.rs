//! Domain model - ids / failure payload / caller-visible errors

pub mod errors;
pub mod failure;
pub mod ids;

pub use self::errors::AdapterError;
pub use self::failure::Failure;
pub use self::ids::{Id, IdMarker, ProxyId, TaskId};
