//! Write intents handed to the persistence layer
//!
//! The engine never writes. It only describes what should be written;
//! `checkmarket-store` executes these.

use serde::{Deserialize, Serialize};

use crate::domain::{Item, ItemFields, ItemPatch};

/// Any write the list can ask the store for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ItemCommand {
    /// New document, id assigned by the store
    Create(ItemFields),
    /// Merge the present fields into an existing document
    Update { id: String, patch: ItemPatch },
    /// Write the whole record under its id, creating it if absent
    Replace(Item),
    Delete { id: String },
}

/// Delete half of an undoable delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteCommand {
    pub id: String,
}

/// Re-inserts the exact record that was deleted, under the same id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestoreCommand {
    pub item: Item,
}

impl From<DeleteCommand> for ItemCommand {
    fn from(cmd: DeleteCommand) -> Self {
        ItemCommand::Delete { id: cmd.id }
    }
}

impl From<RestoreCommand> for ItemCommand {
    fn from(cmd: RestoreCommand) -> Self {
        ItemCommand::Replace(cmd.item)
    }
}

/// Build the delete command and its inverse for `item`
pub fn toggle_undoable_delete(item: &Item) -> (DeleteCommand, RestoreCommand) {
    (
        DeleteCommand { id: item.id.clone() },
        RestoreCommand { item: item.clone() },
    )
}

/// User intent on a single row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwipeAction {
    /// Flip the purchased flag
    MarkPurchased(String),
    Delete(String),
}

impl SwipeAction {
    pub fn id(&self) -> &str {
        match self {
            SwipeAction::MarkPurchased(id) | SwipeAction::Delete(id) => id,
        }
    }
}

/// What a [`SwipeAction`] resolves to
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Write(ItemCommand),
    UndoableDelete {
        delete: DeleteCommand,
        restore: RestoreCommand,
    },
}
