//! Past/future/today classification of entries and their groups.
//!
//! # Responsibility
//! - Derive each dated entry's category from a reference date.
//! - Derive each group's category from its already classified members.
//!
//! # Invariants
//! - `Past` iff `date < reference` by plain string comparison; ISO dates of
//!   the same format order correctly this way.
//! - The first non-past dated entry in document order is the only `today`.
//! - A group is `Future` iff it has at least one `Future` member.

use crate::model::document::{Document, Entry};
use crate::model::view::Category;
use log::debug;

/// Counts produced by one `classify_entries` pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationSummary {
    pub past: usize,
    pub future: usize,
    /// Entries without a date, left unclassified.
    pub skipped: usize,
    /// Date of the entry marked `today`.
    pub today: Option<String>,
}

/// Current UTC calendar date as `YYYY-MM-DD`.
pub fn reference_date_today() -> String {
    chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Classifies every entry of `document` against `reference_date`.
///
/// Previous classification is discarded first, so the pass can be repeated
/// after the document or reference date changes.
pub fn classify_entries(document: &mut Document, reference_date: &str) -> ClassificationSummary {
    let mut summary = ClassificationSummary::default();

    for entry in document.entries_mut() {
        entry.clear_classification();
        match classify_entry(entry, reference_date) {
            Some(Category::Past) => summary.past += 1,
            Some(Category::Future) => {
                summary.future += 1;
                if summary.today.is_none() {
                    entry.today = true;
                    summary.today = entry.date.clone();
                }
            }
            None => summary.skipped += 1,
        }
    }

    debug!(
        "event=classify_entries module=classify status=ok reference={} past={} future={} skipped={} today={}",
        reference_date,
        summary.past,
        summary.future,
        summary.skipped,
        summary.today.as_deref().unwrap_or("none")
    );
    summary
}

/// Derives group categories from their members' categories.
pub fn classify_groups(document: &mut Document) {
    for group in document.groups_mut() {
        let has_future = group
            .entries
            .iter()
            .any(|entry| entry.category == Some(Category::Future));
        group.category = Some(if has_future {
            Category::Future
        } else {
            Category::Past
        });
    }
}

fn classify_entry(entry: &mut Entry, reference_date: &str) -> Option<Category> {
    let date = entry.date.as_deref().filter(|date| !date.is_empty())?;
    let category = if date < reference_date {
        Category::Past
    } else {
        Category::Future
    };
    entry.category = Some(category);
    Some(category)
}
