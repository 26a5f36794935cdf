//! Page structure: entries, week groups, the root container and controls.
//!
//! # Responsibility
//! - Hold entries in document order so "first non-past entry" is well defined.
//! - Locate the controls the view controller keeps in sync.
//!
//! # Invariants
//! - At most one entry carries `today = true` after classification.
//! - Checking a radio control unchecks the other radios sharing its name.

use crate::model::view::{Category, ViewMode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Id of the checkbox mirroring past-entry visibility.
pub const SHOW_PAST_CONTROL_ID: &str = "showpast";
/// Shared `name` of the per-toggle checkboxes.
pub const TOGGLE_CONTROL_NAME: &str = "show";

/// One dated display item, e.g. a calendar day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// ISO-8601 calendar date (`YYYY-MM-DD`). Undated entries are never classified.
    #[serde(default)]
    pub date: Option<String>,
    /// Toggle names this entry is tagged with (extra classes on the page).
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub today: bool,
}

impl Entry {
    pub fn dated(date: impl Into<String>) -> Self {
        Self {
            date: Some(date.into()),
            ..Self::default()
        }
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// `today`, `past` or `future`; `None` while unclassified.
    pub fn label(&self) -> Option<&'static str> {
        if self.today {
            return Some("today");
        }
        self.category.map(Category::as_str)
    }

    /// Classes this entry renders with.
    pub fn classes(&self) -> Vec<String> {
        let mut classes = vec!["day".to_string()];
        if let Some(category) = self.category {
            classes.push(category.as_str().to_string());
        }
        if self.today {
            classes.push("today".to_string());
        }
        classes.extend(self.tags.iter().cloned());
        classes
    }

    pub(crate) fn clear_classification(&mut self) {
        self.category = None;
        self.today = false;
    }
}

/// Entries sharing a coarser time unit, e.g. a week row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    #[serde(default)]
    pub entries: Vec<Entry>,
    #[serde(default)]
    pub category: Option<Category>,
}

impl Group {
    pub fn new(entries: Vec<Entry>) -> Self {
        Self {
            entries,
            category: None,
        }
    }
}

/// Top-level child of the root container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Entry(Entry),
    Group(Group),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlKind {
    Radio,
    Checkbox,
}

/// A radio or checkbox input whose checked state mirrors persisted state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Control {
    pub kind: ControlKind,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub checked: bool,
}

impl Control {
    /// Radio button `viewmode=<mode>` in the `viewmode` group.
    pub fn view_mode_radio(mode: ViewMode) -> Self {
        Self {
            kind: ControlKind::Radio,
            id: Some(view_mode_control_id(mode)),
            name: Some("viewmode".to_string()),
            value: Some(mode.as_str().to_string()),
            checked: false,
        }
    }

    pub fn show_past_checkbox() -> Self {
        Self {
            kind: ControlKind::Checkbox,
            id: Some(SHOW_PAST_CONTROL_ID.to_string()),
            name: None,
            value: None,
            checked: true,
        }
    }

    /// Checkbox `name="show" value="<toggle>"`.
    pub fn toggle_checkbox(toggle: &str) -> Self {
        Self {
            kind: ControlKind::Checkbox,
            id: None,
            name: Some(TOGGLE_CONTROL_NAME.to_string()),
            value: Some(toggle.to_string()),
            checked: true,
        }
    }
}

pub fn view_mode_control_id(mode: ViewMode) -> String {
    format!("viewmode={}", mode.as_str())
}

/// The page the controller classifies and restyles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Classes on the root container (`calendar` / `agenda` live here).
    #[serde(default)]
    pub root_classes: BTreeSet<String>,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub controls: Vec<Control>,
}

impl Document {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// All entries in document order, group members included in place.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.nodes.iter().flat_map(|node| match node {
            Node::Entry(entry) => std::slice::from_ref(entry).iter(),
            Node::Group(group) => group.entries.iter(),
        })
    }

    pub fn entries_mut(&mut self) -> impl Iterator<Item = &mut Entry> {
        self.nodes.iter_mut().flat_map(|node| match node {
            Node::Entry(entry) => std::slice::from_mut(entry).iter_mut(),
            Node::Group(group) => group.entries.iter_mut(),
        })
    }

    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Group(group) => Some(group),
            Node::Entry(_) => None,
        })
    }

    pub fn groups_mut(&mut self) -> impl Iterator<Item = &mut Group> {
        self.nodes.iter_mut().filter_map(|node| match node {
            Node::Group(group) => Some(group),
            Node::Entry(_) => None,
        })
    }

    /// The entry currently marked `today`, if any.
    pub fn today_entry(&self) -> Option<&Entry> {
        self.entries().find(|entry| entry.today)
    }

    pub fn has_root_class(&self, class: &str) -> bool {
        self.root_classes.contains(class)
    }

    pub fn control_by_id(&self, id: &str) -> Option<&Control> {
        self.controls
            .iter()
            .find(|control| control.id.as_deref() == Some(id))
    }

    pub fn toggle_control(&self, toggle: &str) -> Option<&Control> {
        self.controls.iter().find(|control| is_toggle_control(control, toggle))
    }

    /// Sets `checked` on the control with `id`. Returns `false` when absent.
    pub(crate) fn set_checked_by_id(&mut self, id: &str, checked: bool) -> bool {
        let Some(index) = self
            .controls
            .iter()
            .position(|control| control.id.as_deref() == Some(id))
        else {
            return false;
        };
        self.set_checked_at(index, checked);
        true
    }

    pub(crate) fn set_toggle_checked(&mut self, toggle: &str, checked: bool) -> bool {
        let Some(index) = self
            .controls
            .iter()
            .position(|control| is_toggle_control(control, toggle))
        else {
            return false;
        };
        self.set_checked_at(index, checked);
        true
    }

    fn set_checked_at(&mut self, index: usize, checked: bool) {
        let target = &mut self.controls[index];
        target.checked = checked;
        if !(checked && target.kind == ControlKind::Radio) {
            return;
        }

        let Some(group) = target.name.clone() else {
            return;
        };
        for (position, control) in self.controls.iter_mut().enumerate() {
            if position != index
                && control.kind == ControlKind::Radio
                && control.name.as_deref() == Some(group.as_str())
            {
                control.checked = false;
            }
        }
    }
}

fn is_toggle_control(control: &Control, toggle: &str) -> bool {
    control.name.as_deref() == Some(TOGGLE_CONTROL_NAME) && control.value.as_deref() == Some(toggle)
}
