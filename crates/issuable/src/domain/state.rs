//! Issuable lifecycle.
//!
//! An issuable starts `opened`, can be closed, and a closed issuable can be
//! reopened. Transitions that are not defined for the current state are
//! no-ops rather than errors, so repeated external triggers stay safe.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Issuable lifecycle state
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum State {
    /// Created and not yet closed
    #[default]
    Opened,
    /// Closed at some point, then opened again
    Reopened,
    /// Closed
    Closed,
}

/// Explicit lifecycle actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// opened | reopened -> closed
    Close,
    /// closed -> reopened
    Reopen,
}

impl State {
    /// All states that count as "open".
    pub const OPEN: [State; 2] = [State::Opened, State::Reopened];

    /// True for `opened` and `reopened`.
    pub fn is_open(self) -> bool {
        matches!(self, State::Opened | State::Reopened)
    }

    pub fn is_closed(self) -> bool {
        self == State::Closed
    }

    /// Apply a transition.
    ///
    /// Returns the new state when the transition is defined for `self`, or
    /// `None` when it is not (including re-closing a closed issuable).
    pub fn apply(self, transition: Transition) -> Option<State> {
        match (self, transition) {
            (State::Opened | State::Reopened, Transition::Close) => Some(State::Closed),
            (State::Closed, Transition::Reopen) => Some(State::Reopened),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            State::Opened => "opened",
            State::Reopened => "reopened",
            State::Closed => "closed",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for State {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "opened" => Ok(State::Opened),
            "reopened" => Ok(State::Reopened),
            "closed" => Ok(State::Closed),
            _ => Err(format!(
                "Invalid state: '{}'. Expected one of: opened, reopened, closed",
                s
            )),
        }
    }
}
