//! Synchronization & projection
//!
//! - engine: authoritative set, sort, filter, projection
//! - diff: structural ops between successive views
//! - aggregates: totals over the view
//! - commands: write intents for the persistence layer

mod aggregates;
mod commands;
mod diff;
mod engine;

pub use aggregates::{format_amount, Aggregates, DEFAULT_CURRENCY_SYMBOL};
pub use commands::{
    toggle_undoable_delete, ActionOutcome, DeleteCommand, ItemCommand, RestoreCommand, SwipeAction,
};
pub use diff::{apply as apply_ops, diff, ChangeOp};
pub use engine::{ListEngine, Projection};
