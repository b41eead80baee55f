//! Core domain types and operations for issuables.
//!
//! This module provides the domain layer containing:
//! - **types**: Core data structures (Issuable, Label, Note, Milestone, etc.)
//! - **state**: The opened / reopened / closed lifecycle
//!
//! The domain layer is independent of storage and can be used directly for
//! library integration.

pub mod state;
pub mod types;

pub use state::{State, Transition};
pub use types::*;
