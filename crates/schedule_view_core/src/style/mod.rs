//! Hide rules derived from visibility state.
//!
//! # Responsibility
//! - Own the visibility mapping (past flag plus hidden toggle names).
//! - Render the active hide rules from that mapping alone.
//!
//! # Invariants
//! - Rendering is a pure function of `VisibilityState`; the same state always
//!   yields the same rules in the same order.
//! - The four past-entry rules are either all present or all absent.

use crate::model::view::ToggleName;
use std::collections::BTreeSet;

/// Rules hiding past weeks and days in both layouts.
pub const PAST_HIDE_RULES: [&str; 4] = [
    ".calendar .week.past { display: none; }",
    ".calendar > .day.past { display: none; }",
    ".agenda .day.past { display: none; }",
    ".agenda .week.past { display: none; }",
];

/// Which categories of entries are currently shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityState {
    pub show_past: bool,
    hidden: BTreeSet<ToggleName>,
}

impl Default for VisibilityState {
    fn default() -> Self {
        Self {
            show_past: true,
            hidden: BTreeSet::new(),
        }
    }
}

impl VisibilityState {
    /// Records whether entries tagged `name` are visible.
    ///
    /// Returns `true` when the state changed.
    pub fn set_visible(&mut self, name: ToggleName, visible: bool) -> bool {
        if visible {
            self.hidden.remove(&name)
        } else {
            self.hidden.insert(name)
        }
    }

    pub fn is_visible(&self, name: &ToggleName) -> bool {
        !self.hidden.contains(name)
    }

    /// Hidden toggle names in name order.
    pub fn hidden(&self) -> impl Iterator<Item = &ToggleName> {
        self.hidden.iter()
    }
}

/// Hide rule for entries tagged `name`.
pub fn toggle_hide_rule(name: &ToggleName) -> String {
    format!(".{name} {{ display: none; }}")
}

/// Active hide rules: past rules first, then toggles by name.
pub fn render_hide_rules(state: &VisibilityState) -> Vec<String> {
    let mut rules = Vec::new();
    if !state.show_past {
        rules.extend(PAST_HIDE_RULES.iter().map(|rule| (*rule).to_string()));
    }
    rules.extend(state.hidden().map(toggle_hide_rule));
    rules
}

/// Active hide rules as one stylesheet, one rule per line.
pub fn render_stylesheet(state: &VisibilityState) -> String {
    let mut css = String::new();
    for rule in render_hide_rules(state) {
        css.push_str(&rule);
        css.push('\n');
    }
    css
}
