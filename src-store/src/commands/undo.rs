//! Undo window for deletes

use chrono::{DateTime, Duration, Utc};

use checkmarket::RestoreCommand;

/// A restore that can be offered until `expires_at`
#[derive(Debug, Clone, PartialEq)]
pub struct PendingUndo {
    pub restore: RestoreCommand,
    /// Short message for the undo prompt
    pub label: String,
    pub expires_at: DateTime<Utc>,
}

impl PendingUndo {
    pub fn new(restore: RestoreCommand, window: Duration, now: DateTime<Utc>) -> Self {
        let label = format!("'{}' removed", restore.item.name);
        Self {
            restore,
            label,
            expires_at: now.checked_add_signed(window).unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    /// The restore command, or `None` once the window has closed
    pub fn take(self, now: DateTime<Utc>) -> Option<RestoreCommand> {
        self.is_live(now).then_some(self.restore)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkmarket::{Item, ItemFields};

    fn restore() -> RestoreCommand {
        RestoreCommand {
            item: Item::new(
                "k9",
                ItemFields {
                    name: "Bread".into(),
                    quantity: 1,
                    unit_price: 2.0,
                    category: "Bakery".into(),
                },
            ),
        }
    }

    #[test]
    fn test_label_names_item() {
        let pending = PendingUndo::new(restore(), Duration::seconds(3), Utc::now());
        assert_eq!(pending.label, "'Bread' removed");
    }

    #[test]
    fn test_take_within_window() {
        let now = Utc::now();
        let pending = PendingUndo::new(restore(), Duration::seconds(3), now);
        let cmd = pending.take(now + Duration::seconds(2)).expect("window still open");
        assert_eq!(cmd.item.id, "k9");
    }

    #[test]
    fn test_window_past_calendar_end_saturates() {
        let now = Utc::now();
        let pending = PendingUndo::new(restore(), Duration::days(365 * 300_000), now);
        assert_eq!(pending.expires_at, DateTime::<Utc>::MAX_UTC);
        assert!(pending.is_live(now));
    }

    #[test]
    fn test_take_after_window() {
        let now = Utc::now();
        let pending = PendingUndo::new(restore(), Duration::seconds(3), now);
        assert!(!pending.is_live(now + Duration::seconds(3)));
        assert!(pending.take(now + Duration::seconds(4)).is_none());
    }
}
