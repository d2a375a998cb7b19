//! Item write handlers
//!
//! Bridges raw form input and engine-produced commands to the repository.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use checkmarket::{validate_and_normalize, FieldErrors, Item, ItemCommand, ItemPatch};

use crate::error::UpstreamError;
use crate::repository::{ItemRepository, Repository};

/// Unvalidated text from the add/edit form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawItemForm {
    pub name: String,
    pub quantity: String,
    pub price: String,
    pub category: String,
}

impl RawItemForm {
    /// Prefill the form for editing an existing item
    pub fn from_item(item: &Item) -> Self {
        Self {
            name: item.name.clone(),
            quantity: item.quantity.to_string(),
            price: item.unit_price.to_string(),
            category: item.category.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Created(String),
    Updated(String),
}

impl SaveOutcome {
    pub fn id(&self) -> &str {
        match self {
            SaveOutcome::Created(id) | SaveOutcome::Updated(id) => id,
        }
    }
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("invalid item: {0}")]
    Invalid(#[from] FieldErrors),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// Validate the form, then create a new item or patch the edited one.
/// Nothing is written when any field is rejected.
pub async fn save_item(
    repo: &ItemRepository,
    editing: Option<&Item>,
    form: &RawItemForm,
) -> Result<SaveOutcome, SaveError> {
    let fields = validate_and_normalize(&form.name, &form.quantity, &form.price, &form.category)
        .inspect_err(|errors| warn!(rejected = errors.len(), "item form rejected"))?;

    match editing.filter(|item| item.is_saved()) {
        Some(item) => {
            repo.update(&item.id, &ItemPatch::from(fields)).await?;
            Ok(SaveOutcome::Updated(item.id.clone()))
        }
        None => {
            let id = repo.create(&Item::draft(fields)).await?;
            Ok(SaveOutcome::Created(id))
        }
    }
}

/// Run a command produced by the engine.
/// Returns the new id for `Create`.
pub async fn execute(repo: &ItemRepository, command: ItemCommand) -> Result<Option<String>, UpstreamError> {
    match command {
        ItemCommand::Create(fields) => repo.create(&Item::draft(fields)).await.map(Some),
        ItemCommand::Update { id, patch } => repo.update(&id, &patch).await.map(|_| None),
        ItemCommand::Replace(item) => repo.replace(&item).await.map(|_| None),
        ItemCommand::Delete { id } => repo.delete(&id).await.map(|_| None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{init_db, MEMORY_DB};
    use checkmarket::ValidationError;
    use std::path::Path;

    async fn setup_repo() -> ItemRepository {
        let db = init_db(Path::new(MEMORY_DB))
            .await
            .expect("Failed to init test DB");
        ItemRepository::new(db.connection())
    }

    fn form(name: &str, quantity: &str, price: &str, category: &str) -> RawItemForm {
        RawItemForm {
            name: name.to_string(),
            quantity: quantity.to_string(),
            price: price.to_string(),
            category: category.to_string(),
        }
    }

    #[tokio::test]
    async fn test_save_creates_normalized_item() {
        let repo = setup_repo().await;
        let outcome = save_item(&repo, None, &form("  Milk ", "2", "1,5", "Grocery"))
            .await
            .expect("Failed to save");

        let SaveOutcome::Created(id) = outcome else {
            panic!("expected a create");
        };
        let stored = repo.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Milk");
        assert_eq!(stored.quantity, 2);
        assert_eq!(stored.unit_price, 1.5);
        assert!(!stored.purchased);
    }

    #[tokio::test]
    async fn test_save_reports_every_bad_field() {
        let repo = setup_repo().await;
        let err = save_item(&repo, None, &form("", "0", "-1", ""))
            .await
            .unwrap_err();

        let SaveError::Invalid(errors) = err else {
            panic!("expected validation errors");
        };
        assert_eq!(errors.len(), 4);
        assert_eq!(errors.quantity, Some(ValidationError::NotPositive));
        assert_eq!(errors.price, Some(ValidationError::Negative));
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_edit_keeps_purchased_flag() {
        let repo = setup_repo().await;
        let id = execute(
            &repo,
            ItemCommand::Create(checkmarket::ItemFields {
                name: "Eggs".into(),
                quantity: 6,
                unit_price: 0.3,
                category: "Grocery".into(),
            }),
        )
        .await
        .unwrap()
        .unwrap();
        repo.update(&id, &ItemPatch::purchased(true)).await.unwrap();
        let current = repo.find_by_id(&id).await.unwrap().unwrap();

        let mut edit = RawItemForm::from_item(&current);
        edit.quantity = "12".to_string();
        let outcome = save_item(&repo, Some(&current), &edit).await.unwrap();
        assert_eq!(outcome, SaveOutcome::Updated(id.clone()));

        let stored = repo.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(stored.quantity, 12);
        assert!(stored.purchased);
    }

    #[tokio::test]
    async fn test_save_draft_editing_creates() {
        let repo = setup_repo().await;
        let draft = Item::draft(checkmarket::ItemFields {
            name: "Tea".into(),
            quantity: 1,
            unit_price: 0.0,
            category: "Grocery".into(),
        });
        let outcome = save_item(&repo, Some(&draft), &form("Tea", "1", "", "Grocery"))
            .await
            .unwrap();
        assert!(matches!(outcome, SaveOutcome::Created(_)));
    }

    #[tokio::test]
    async fn test_execute_delete_and_replace() {
        let repo = setup_repo().await;
        let id = save_item(&repo, None, &form("Soap", "1", "2", "Hygiene"))
            .await
            .unwrap()
            .id()
            .to_string();
        let item = repo.find_by_id(&id).await.unwrap().unwrap();

        execute(&repo, ItemCommand::Delete { id: id.clone() }).await.unwrap();
        assert!(repo.find_by_id(&id).await.unwrap().is_none());

        execute(&repo, ItemCommand::Replace(item.clone())).await.unwrap();
        assert_eq!(repo.find_by_id(&id).await.unwrap(), Some(item));
    }

    #[tokio::test]
    async fn test_execute_update_missing_is_not_found() {
        let repo = setup_repo().await;
        let err = execute(
            &repo,
            ItemCommand::Update {
                id: "ghost".into(),
                patch: ItemPatch::purchased(true),
            },
        )
        .await
        .unwrap_err();
        assert!(err.is_not_found());
    }
}
