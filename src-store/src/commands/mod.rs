//! Commands Layer
//!
//! Write handlers that bridge user input and engine intents to the store.

mod item_cmd;
mod undo;

pub use item_cmd::*;
pub use undo::PendingUndo;
