//! Generic linear lookup
//!
//! Every typed lookup in the catalog is a [`lookup`] call with a different
//! [`Matcher`]. Candidates are scanned in ascending index order, so when a
//! table holds duplicate keys the first occurrence wins.

use crate::bus::CanBus;
use crate::descriptors::{Command, Signal, SignalState};

/// Decides whether a candidate matches a lookup key
pub trait Matcher<K: ?Sized, C> {
    fn matches(&self, key: &K, candidate: &C) -> bool;
}

/// Return the index of the first candidate matching `key`, or `None`
pub fn lookup<K, C, M>(key: &K, candidates: &[C], matcher: &M) -> Option<usize>
where
    K: ?Sized,
    M: Matcher<K, C>,
{
    candidates
        .iter()
        .position(|candidate| matcher.matches(key, candidate))
}

/// Signal state by exact name
#[derive(Debug, Clone, Copy, Default)]
pub struct StateNameMatch;

impl Matcher<str, SignalState> for StateNameMatch {
    fn matches(&self, key: &str, candidate: &SignalState) -> bool {
        candidate.name == key
    }
}

/// Signal state by exact integer value
#[derive(Debug, Clone, Copy, Default)]
pub struct StateValueMatch;

impl Matcher<i32, SignalState> for StateValueMatch {
    fn matches(&self, key: &i32, candidate: &SignalState) -> bool {
        candidate.value == *key
    }
}

/// Signal by exact generic name
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalNameMatch;

impl Matcher<str, Signal> for SignalNameMatch {
    fn matches(&self, key: &str, candidate: &Signal) -> bool {
        candidate.generic_name == key
    }
}

/// Signal by exact generic name, writable signals only
#[derive(Debug, Clone, Copy, Default)]
pub struct WritableSignalMatch;

impl Matcher<str, Signal> for WritableSignalMatch {
    fn matches(&self, key: &str, candidate: &Signal) -> bool {
        candidate.writable && SignalNameMatch.matches(key, candidate)
    }
}

/// Signal matcher selected by a `writable_only` flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalMatch {
    Any,
    WritableOnly,
}

impl SignalMatch {
    pub fn from_writable_only(writable_only: bool) -> Self {
        if writable_only {
            SignalMatch::WritableOnly
        } else {
            SignalMatch::Any
        }
    }
}

impl Matcher<str, Signal> for SignalMatch {
    fn matches(&self, key: &str, candidate: &Signal) -> bool {
        match self {
            SignalMatch::Any => SignalNameMatch.matches(key, candidate),
            SignalMatch::WritableOnly => WritableSignalMatch.matches(key, candidate),
        }
    }
}

/// Command by exact generic name
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandNameMatch;

impl Matcher<str, Command> for CommandNameMatch {
    fn matches(&self, key: &str, candidate: &Command) -> bool {
        candidate.generic_name == key
    }
}

/// Bus by numeric address
#[derive(Debug, Clone, Copy, Default)]
pub struct BusAddressMatch;

impl Matcher<u8, CanBus> for BusAddressMatch {
    fn matches(&self, key: &u8, candidate: &CanBus) -> bool {
        candidate.address == *key
    }
}
