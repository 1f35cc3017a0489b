mod config;
mod infra;
mod operation;

pub use self::config::{ConfigError, ConfigErrorExt};
pub use self::infra::{InfraError, InfraErrorExt};
pub use self::operation::{OperationError, OperationErrorExt};
