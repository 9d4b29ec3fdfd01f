//! Descriptor types
//!
//! Signals, signal states and commands as produced by the configuration
//! tooling. The tables are built once at startup and never modified by this
//! crate.

use serde::{Deserialize, Serialize};

/// A named symbolic value within a signal's enumeration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalState {
    /// State name, unique within the owning signal
    pub name: String,
    /// Raw integer value, unique within the owning signal
    pub value: i32,
}

impl SignalState {
    pub fn new(name: impl Into<String>, value: i32) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// A named value carried on the bus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    /// Generic (transport independent) name, unique per signal table
    pub generic_name: String,
    /// True if the signal may be written from outside
    #[serde(default)]
    pub writable: bool,
    /// Enumerated states, in declaration order
    #[serde(default)]
    pub states: Vec<SignalState>,
}

impl Signal {
    /// Create a read-only signal without states
    pub fn new(generic_name: impl Into<String>) -> Self {
        Self {
            generic_name: generic_name.into(),
            writable: false,
            states: Vec::new(),
        }
    }

    /// Builder method: mark the signal writable
    pub fn with_writable(mut self, writable: bool) -> Self {
        self.writable = writable;
        self
    }

    /// Builder method: append a state
    pub fn add_state(mut self, name: impl Into<String>, value: i32) -> Self {
        self.states.push(SignalState::new(name, value));
        self
    }
}

/// An externally invokable control action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// Generic name, unique per command table
    pub generic_name: String,
}

impl Command {
    pub fn new(generic_name: impl Into<String>) -> Self {
        Self {
            generic_name: generic_name.into(),
        }
    }
}
