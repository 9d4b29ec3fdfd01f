//! Descriptor catalog
//!
//! Typed lookups over the fixed signal and command tables. A missing
//! descriptor is a normal outcome (the caller usually drops the message), so
//! every lookup returns `Option`.

use crate::bus::CanBus;
use crate::descriptors::{Command, Signal, SignalState};
use crate::lookup::{
    lookup, BusAddressMatch, CommandNameMatch, SignalMatch, StateNameMatch, StateValueMatch,
};
use crate::types::{CatalogError, Result};
use std::collections::HashSet;

/// Find a state of `signal` by name
pub fn find_signal_state_by_name<'a>(name: &str, signal: &'a Signal) -> Option<&'a SignalState> {
    lookup(name, &signal.states, &StateNameMatch).map(|index| &signal.states[index])
}

/// Find a state of `signal` by raw value
pub fn find_signal_state_by_value(value: i32, signal: &Signal) -> Option<&SignalState> {
    lookup(&value, &signal.states, &StateValueMatch).map(|index| &signal.states[index])
}

/// Find a signal by generic name
pub fn find_signal<'a>(name: &str, signals: &'a [Signal]) -> Option<&'a Signal> {
    find_signal_filtered(name, signals, false)
}

/// Find a signal by generic name, optionally only among writable signals
pub fn find_signal_filtered<'a>(
    name: &str,
    signals: &'a [Signal],
    writable_only: bool,
) -> Option<&'a Signal> {
    let matcher = SignalMatch::from_writable_only(writable_only);
    lookup(name, signals, &matcher).map(|index| &signals[index])
}

/// Find a command by generic name
pub fn find_command<'a>(name: &str, commands: &'a [Command]) -> Option<&'a Command> {
    lookup(name, commands, &CommandNameMatch).map(|index| &commands[index])
}

/// Find a bus by controller address
pub fn find_bus(address: u8, buses: &[CanBus]) -> Option<&CanBus> {
    lookup(&address, buses, &BusAddressMatch).map(|index| &buses[index])
}

/// The signal and command tables of one session
#[derive(Debug, Clone, Default)]
pub struct DescriptorCatalog {
    signals: Vec<Signal>,
    commands: Vec<Command>,
}

impl DescriptorCatalog {
    pub fn new(signals: Vec<Signal>, commands: Vec<Command>) -> Self {
        Self { signals, commands }
    }

    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn signal(&self, name: &str) -> Option<&Signal> {
        find_signal(name, &self.signals)
    }

    pub fn writable_signal(&self, name: &str) -> Option<&Signal> {
        find_signal_filtered(name, &self.signals, true)
    }

    pub fn command(&self, name: &str) -> Option<&Command> {
        find_command(name, &self.commands)
    }

    /// Resolve a state by signal name and state name
    pub fn signal_state(&self, signal_name: &str, state_name: &str) -> Option<&SignalState> {
        self.signal(signal_name)
            .and_then(|signal| find_signal_state_by_name(state_name, signal))
    }

    /// Resolve a state by signal name and raw value
    pub fn signal_state_by_value(&self, signal_name: &str, value: i32) -> Option<&SignalState> {
        self.signal(signal_name)
            .and_then(|signal| find_signal_state_by_value(value, signal))
    }

    /// Get catalog statistics
    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            num_signals: self.signals.len(),
            num_writable_signals: self.signals.iter().filter(|s| s.writable).count(),
            num_states: self.signals.iter().map(|s| s.states.len()).sum(),
            num_commands: self.commands.len(),
        }
    }

    /// Report every duplicate name or value in the tables
    ///
    /// Duplicates do not change lookup results (the first entry still wins),
    /// they only make later entries unreachable.
    pub fn validate(&self) -> Vec<CatalogError> {
        let mut issues = Vec::new();

        let mut signal_names = HashSet::new();
        for signal in &self.signals {
            if !signal_names.insert(signal.generic_name.as_str()) {
                issues.push(CatalogError::DuplicateSignal(signal.generic_name.clone()));
            }

            let mut state_names = HashSet::new();
            let mut state_values = HashSet::new();
            for state in &signal.states {
                if !state_names.insert(state.name.as_str()) {
                    issues.push(CatalogError::DuplicateStateName {
                        signal: signal.generic_name.clone(),
                        state: state.name.clone(),
                    });
                }
                if !state_values.insert(state.value) {
                    issues.push(CatalogError::DuplicateStateValue {
                        signal: signal.generic_name.clone(),
                        value: state.value,
                    });
                }
            }
        }

        let mut command_names = HashSet::new();
        for command in &self.commands {
            if !command_names.insert(command.generic_name.as_str()) {
                issues.push(CatalogError::DuplicateCommand(command.generic_name.clone()));
            }
        }

        for issue in &issues {
            log::warn!("{}", issue);
        }
        issues
    }

    /// Like [`validate`](Self::validate), failing on the first issue
    pub fn validate_strict(&self) -> Result<()> {
        match self.validate().into_iter().next() {
            Some(issue) => Err(issue),
            None => Ok(()),
        }
    }
}

/// Catalog statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogStats {
    pub num_signals: usize,
    pub num_writable_signals: usize,
    pub num_states: usize,
    pub num_commands: usize,
}
