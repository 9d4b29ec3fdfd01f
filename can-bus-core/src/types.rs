//! Error types for the CAN bus core
//!
//! Lookups in this crate never fail with an error: a missing descriptor is an
//! expected outcome and is reported as `None`. The only errors are produced when
//! validating a descriptor table, where duplicate names or values are caller
//! mistakes worth surfacing before a session starts.

/// Result type for catalog validation
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Problems found while validating descriptor tables
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("Duplicate signal name: {0}")]
    DuplicateSignal(String),

    #[error("Duplicate state name '{state}' in signal {signal}")]
    DuplicateStateName { signal: String, state: String },

    #[error("Duplicate state value {value} in signal {signal}")]
    DuplicateStateValue { signal: String, value: i32 },

    #[error("Duplicate command name: {0}")]
    DuplicateCommand(String),
}
