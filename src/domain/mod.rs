//! Domain Layer
//!
//! Contains the shopping-list entity and core abstractions.
//! No I/O here; only serde and thiserror.

mod entity;
mod item;

pub use entity::{DomainError, DomainResult, Entity};
pub use item::{Item, ItemFields, ItemPatch, SortKey, CATEGORY_SUGGESTIONS};
