//! View-level value types: entry categories, view modes and toggle names.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static TOGGLE_NAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*$").expect("toggle name pattern is valid")
});

/// Temporal category derived for an entry or group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Past,
    Future,
}

impl Category {
    /// Class name used for this category on the page.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Past => "past",
            Self::Future => "future",
        }
    }
}

/// Overall page layout. Exactly one mode is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    Calendar,
    Agenda,
}

impl ViewMode {
    pub const ALL: [ViewMode; 2] = [ViewMode::Calendar, ViewMode::Agenda];

    /// Persisted and class-name form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Calendar => "calendar",
            Self::Agenda => "agenda",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "calendar" => Some(Self::Calendar),
            "agenda" => Some(Self::Agenda),
            _ => None,
        }
    }

    /// The mode that is deactivated when `self` becomes active.
    pub fn other(self) -> Self {
        match self {
            Self::Calendar => Self::Agenda,
            Self::Agenda => Self::Calendar,
        }
    }
}

impl Display for ViewMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name of a visibility toggle, usable verbatim as a class selector.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ToggleName(String);

impl ToggleName {
    /// Validates `value` as a class-selector-safe identifier.
    pub fn parse(value: &str) -> Result<Self, InvalidToggleName> {
        if TOGGLE_NAME_PATTERN.is_match(value) {
            Ok(Self(value.to_string()))
        } else {
            Err(InvalidToggleName(value.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ToggleName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rejected toggle name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidToggleName(pub String);

impl Display for InvalidToggleName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid toggle name `{}`; expected a letter or `_` followed by letters, digits, `_` or `-`",
            self.0
        )
    }
}

impl Error for InvalidToggleName {}
