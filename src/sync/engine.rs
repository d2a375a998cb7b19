//! List Synchronization & Projection Engine
//!
//! Holds the authoritative item set from the latest upstream snapshot plus
//! the active sort key and filter, and derives the display view from them.
//! Everything here is synchronous; callers feed snapshots one at a time.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::{DomainError, DomainResult, Item, SortKey};
use super::aggregates::Aggregates;
use super::commands::{toggle_undoable_delete, ActionOutcome, ItemCommand, SwipeAction};
use super::diff::{diff, ChangeOp};

/// Output of [`ListEngine::project`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    pub view: Vec<Item>,
    pub diff: Vec<ChangeOp>,
    pub aggregates: Aggregates,
    pub is_empty: bool,
}

#[derive(Debug, Default)]
pub struct ListEngine {
    authoritative: HashMap<String, Item>,
    sort_key: SortKey,
    filter_query: Option<String>,
    last_view: Vec<Item>,
}

impl ListEngine {
    /// Name ordering, no filter, nothing ingested
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sort_key(sort_key: SortKey) -> Self {
        Self {
            sort_key,
            ..Self::default()
        }
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    pub fn filter_query(&self) -> Option<&str> {
        self.filter_query.as_deref()
    }

    pub fn item(&self, id: &str) -> Option<&Item> {
        self.authoritative.get(id)
    }

    pub fn len(&self) -> usize {
        self.authoritative.len()
    }

    pub fn is_empty(&self) -> bool {
        self.authoritative.is_empty()
    }

    /// Replace the authoritative set with a full snapshot.
    /// A repeated id keeps its last occurrence.
    pub fn ingest_snapshot<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = Item>,
    {
        let mut next = HashMap::new();
        for item in items {
            if let Some(previous) = next.insert(item.id.clone(), item) {
                warn!(id = %previous.id, "snapshot lists the same id twice, keeping the later one");
            }
        }
        debug!(items = next.len(), "snapshot ingested");
        self.authoritative = next;
    }

    /// Switch ordering. Re-issuing the upstream query is the caller's job;
    /// the engine re-sorts what it already has.
    pub fn set_sort_key(&mut self, key: SortKey) {
        self.sort_key = key;
    }

    /// `None` or a blank string clears the filter
    pub fn set_filter_query(&mut self, query: Option<&str>) {
        self.filter_query = query
            .filter(|q| !q.trim().is_empty())
            .map(str::to_string);
    }

    /// Derive the current view and diff it against the previous one
    pub fn project(&mut self) -> Projection {
        let needle = self.filter_query.as_deref().map(str::to_lowercase);
        let mut view: Vec<Item> = self
            .authoritative
            .values()
            .filter(|item| needle.as_deref().map_or(true, |q| matches_query(item, q)))
            .cloned()
            .collect();
        let key = self.sort_key;
        view.sort_by(|a, b| compare(key, a, b));

        let ops = diff(&self.last_view, &view);
        let aggregates = Aggregates::over(&view);
        let is_empty = view.is_empty();
        debug!(view = view.len(), ops = ops.len(), sort = key.as_str(), "projected");

        self.last_view = view.clone();
        Projection {
            view,
            diff: ops,
            aggregates,
            is_empty,
        }
    }

    /// Resolve a row action against the current authoritative set
    pub fn dispatch(&self, action: &SwipeAction) -> DomainResult<ActionOutcome> {
        let item = self
            .item(action.id())
            .ok_or_else(|| DomainError::NotFound(format!("Item {} not found", action.id())))?;

        Ok(match action {
            SwipeAction::MarkPurchased(_) => {
                ActionOutcome::Write(ItemCommand::Replace(item.with_purchased(!item.purchased)))
            }
            SwipeAction::Delete(_) => {
                let (delete, restore) = toggle_undoable_delete(item);
                ActionOutcome::UndoableDelete { delete, restore }
            }
        })
    }
}

/// `query` must already be lowercase
fn matches_query(item: &Item, query: &str) -> bool {
    item.name.to_lowercase().contains(query) || item.category.to_lowercase().contains(query)
}

fn compare(key: SortKey, a: &Item, b: &Item) -> Ordering {
    let primary = match key {
        SortKey::Name => a.name.cmp(&b.name),
        SortKey::Category => a.category.cmp(&b.category),
        SortKey::PurchasedStatus => a.purchased.cmp(&b.purchased),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, name: &str, category: &str) -> Item {
        Item {
            id: id.to_string(),
            name: name.to_string(),
            quantity: 1,
            unit_price: 0.0,
            category: category.to_string(),
            purchased: false,
        }
    }

    fn view_ids(p: &Projection) -> Vec<&str> {
        p.view.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn test_defaults() {
        let engine = ListEngine::new();
        assert_eq!(engine.sort_key(), SortKey::Name);
        assert!(engine.filter_query().is_none());
        assert!(engine.is_empty());
    }

    #[test]
    fn test_name_ties_break_on_id() {
        let mut engine = ListEngine::new();
        engine.ingest_snapshot(vec![item("b", "Milk", "Grocery"), item("a", "Milk", "Grocery")]);
        assert_eq!(view_ids(&engine.project()), vec!["a", "b"]);
    }

    #[test]
    fn test_resorts_regardless_of_upstream_order() {
        let mut engine = ListEngine::with_sort_key(SortKey::Category);
        engine.ingest_snapshot(vec![
            item("1", "Apples", "Produce"),
            item("2", "Bread", "Bakery"),
            item("3", "Steak", "Butcher"),
        ]);
        assert_eq!(view_ids(&engine.project()), vec!["2", "3", "1"]);
    }

    #[test]
    fn test_purchased_items_sort_last() {
        let mut engine = ListEngine::with_sort_key(SortKey::PurchasedStatus);
        let mut done = item("a", "Apples", "Produce");
        done.purchased = true;
        engine.ingest_snapshot(vec![done, item("b", "Bread", "Bakery")]);
        assert_eq!(view_ids(&engine.project()), vec!["b", "a"]);
    }

    #[test]
    fn test_filter_is_case_insensitive_on_name_or_category() {
        let mut engine = ListEngine::new();
        engine.ingest_snapshot(vec![
            item("1", "Whole Milk", "Grocery"),
            item("2", "Shampoo", "Hygiene"),
            item("3", "Toothpaste", "HYGIENE"),
        ]);

        engine.set_filter_query(Some("milk"));
        assert_eq!(view_ids(&engine.project()), vec!["1"]);

        engine.set_filter_query(Some("hyg"));
        assert_eq!(view_ids(&engine.project()), vec!["2", "3"]);

        engine.set_filter_query(Some("   "));
        assert!(engine.filter_query().is_none());
        assert_eq!(engine.project().view.len(), 3);
    }

    #[test]
    fn test_aggregates_follow_filter() {
        let mut engine = ListEngine::new();
        let mut milk = item("1", "Milk", "Grocery");
        milk.unit_price = 2.0;
        milk.quantity = 3;
        let mut soap = item("2", "Soap", "Hygiene");
        soap.unit_price = 5.0;
        engine.ingest_snapshot(vec![milk, soap]);

        assert_eq!(engine.project().aggregates.total_planned, 11.0);
        engine.set_filter_query(Some("soap"));
        assert_eq!(engine.project().aggregates.total_planned, 5.0);
    }

    #[test]
    fn test_second_projection_has_empty_diff() {
        let mut engine = ListEngine::new();
        engine.ingest_snapshot(vec![item("1", "Milk", "Grocery")]);
        let first = engine.project();
        assert_eq!(first.diff.len(), 1);
        let second = engine.project();
        assert!(second.diff.is_empty());
        assert_eq!(first.view, second.view);
    }

    #[test]
    fn test_snapshot_fully_replaces_state() {
        let mut engine = ListEngine::new();
        engine.ingest_snapshot(vec![item("1", "Milk", "Grocery"), item("2", "Eggs", "Grocery")]);
        engine.project();

        engine.ingest_snapshot(vec![item("2", "Eggs", "Grocery")]);
        let projection = engine.project();
        assert_eq!(view_ids(&projection), vec!["2"]);
        assert_eq!(projection.diff, vec![ChangeOp::Remove { id: "1".into() }]);
        assert!(engine.item("1").is_none());
    }

    #[test]
    fn test_empty_flag() {
        let mut engine = ListEngine::new();
        assert!(engine.project().is_empty);
        engine.ingest_snapshot(vec![item("1", "Milk", "Grocery")]);
        engine.set_filter_query(Some("nothing matches"));
        assert!(engine.project().is_empty);
    }

    #[test]
    fn test_duplicate_ids_keep_last() {
        let mut engine = ListEngine::new();
        engine.ingest_snapshot(vec![item("1", "Milk", "Grocery"), item("1", "Oat milk", "Grocery")]);
        assert_eq!(engine.len(), 1);
        assert_eq!(engine.item("1").unwrap().name, "Oat milk");
    }

    #[test]
    fn test_dispatch_mark_purchased_toggles() {
        let mut engine = ListEngine::new();
        engine.ingest_snapshot(vec![item("1", "Milk", "Grocery")]);

        match engine.dispatch(&SwipeAction::MarkPurchased("1".into())).unwrap() {
            ActionOutcome::Write(ItemCommand::Replace(updated)) => {
                assert!(updated.purchased);
                assert_eq!(updated.id, "1");
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_dispatch_delete_is_undoable() {
        let mut engine = ListEngine::new();
        let original = item("1", "Milk", "Grocery");
        engine.ingest_snapshot(vec![original.clone()]);

        match engine.dispatch(&SwipeAction::Delete("1".into())).unwrap() {
            ActionOutcome::UndoableDelete { delete, restore } => {
                assert_eq!(delete.id, "1");
                assert_eq!(restore.item, original);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_dispatch_unknown_id() {
        let engine = ListEngine::new();
        assert!(matches!(
            engine.dispatch(&SwipeAction::Delete("nope".into())),
            Err(DomainError::NotFound(_))
        ));
    }
}
