//! Issuable query, ordering and consistency engine
//!
//! Issues and merge requests ("issuables") share one set of behaviors:
//! composable filters, milestone and vote ordering, a small state machine,
//! race-safe label attachment by name and assignee cache upkeep. This
//! library provides those behaviors over a pluggable store; the `issuable`
//! binary drives them from the command line.

pub mod assignee_cache;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod labels;
pub mod output;
pub mod query;
pub mod storage;
pub mod votes;

// Re-export commonly used types
pub use commands::{CommandExecutor, Transitioned};
pub use domain::{Issuable, IssuableKind, NewIssuable, State};
pub use errors::IssuableError;
pub use output::{ExitCode, JsonError, JsonOutput};
pub use query::{IssuableFilter, SortKey};
pub use storage::{InMemoryStorage, IssuableStore, JsonFileStorage};
