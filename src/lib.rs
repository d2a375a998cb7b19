//! Checkmarket core
//!
//! Layered like the store crate that sits on top of it:
//! - domain: the shopping-list item and its value types
//! - validation: raw form text to item fields
//! - document: stored document form and its typed decoder
//! - sync: snapshot ingestion, sorted/filtered projection, diff, totals

pub mod document;
pub mod domain;
pub mod sync;
pub mod validation;

pub use document::{decode_document, decode_snapshot, DecodeError};
pub use domain::{DomainError, DomainResult, Entity, Item, ItemFields, ItemPatch, SortKey, CATEGORY_SUGGESTIONS};
pub use sync::{
    toggle_undoable_delete, ActionOutcome, Aggregates, ChangeOp, DeleteCommand, ItemCommand, ListEngine,
    Projection, RestoreCommand, SwipeAction,
};
pub use validation::{validate_and_normalize, FieldErrors, ValidationError};
