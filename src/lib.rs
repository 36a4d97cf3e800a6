//! # Backlog Core
//!
//! Board state and local persistence for a local-first kanban backlog tracker.
//!
//! Cards live in four fixed columns (Backlog, To Do, In Progress, Done).
//! Every board operation is a pure function over an immutable snapshot; the
//! rendering layer owns the current snapshot (or a [`BoardSession`]) and
//! feeds user actions through these functions. Persistence goes through a
//! [`KeyValueStore`] with a versioned migration path for older payloads.

pub mod config;
pub mod domain;
pub mod error;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use config::BoardConfig;
pub use domain::{
    board::{BoardState, ColumnLists},
    card::{CardColor, CardId, CardInput, CardPatch, ColumnId, Priority, TaskCard},
    filter::BoardFilters,
    triage::{MissingField, MissingFields, TriageAction},
};
pub use error::{BoardError, Result};
pub use session::{BoardSession, SaveDebouncer};
pub use storage::{
    BoardRepository, KeyValueStore, LoadOrigin, LoadOutcome, LoadWarning, MemoryStore,
};
