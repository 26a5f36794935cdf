//! View-state controller: view mode, visibility toggles and their replay.
//!
//! # Responsibility
//! - Apply user choices to the page state and persist each one.
//! - Rebuild the last session's view from persisted preferences at load.
//!
//! # Invariants
//! - Classification always runs before preference replay (`bootstrap`).
//! - Exactly one of `calendar` / `agenda` is on the root after a mode change.
//! - Hide rules are derived from `VisibilityState`, so repeating a toggle
//!   with the same value changes nothing.
//! - Missing controls are skipped silently.

use crate::model::document::{view_mode_control_id, Document, SHOW_PAST_CONTROL_ID};
use crate::model::view::{InvalidToggleName, ToggleName, ViewMode};
use crate::repo::pref_store::{
    toggle_key, PrefStore, StoreError, PERSIST_TTL, SHOW_PAST_KEY, TOGGLE_KEY_PREFIX,
    VIEW_MODE_KEY,
};
use crate::service::classify::{classify_entries, classify_groups};
use crate::style::{render_hide_rules, render_stylesheet, VisibilityState};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub type ViewResult<T> = Result<T, ViewError>;

#[derive(Debug)]
pub enum ViewError {
    Store(StoreError),
    InvalidToggleName(InvalidToggleName),
}

impl Display for ViewError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::InvalidToggleName(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ViewError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::InvalidToggleName(err) => Some(err),
        }
    }
}

impl From<StoreError> for ViewError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<InvalidToggleName> for ViewError {
    fn from(value: InvalidToggleName) -> Self {
        Self::InvalidToggleName(value)
    }
}

/// Everything the controller mutates, built once per page load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    pub document: Document,
    pub visibility: VisibilityState,
    pub view_mode: Option<ViewMode>,
}

impl AppState {
    /// Wraps `document`, taking the active mode from its root classes.
    pub fn new(document: Document) -> Self {
        let view_mode = ViewMode::ALL
            .into_iter()
            .find(|mode| document.has_root_class(mode.as_str()));
        Self {
            document,
            visibility: VisibilityState::default(),
            view_mode,
        }
    }

    pub fn hide_rules(&self) -> Vec<String> {
        render_hide_rules(&self.visibility)
    }

    pub fn stylesheet(&self) -> String {
        render_stylesheet(&self.visibility)
    }
}

/// What one replay pass did with the persisted entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreSummary {
    pub applied: usize,
    /// Applied entries saved again with a fresh expiry.
    pub refreshed: usize,
    pub ignored: usize,
}

/// Use-case service binding page state to a preference store.
pub struct ViewStateService<S: PrefStore> {
    store: S,
    ttl: Duration,
}

impl<S: PrefStore> ViewStateService<S> {
    /// Creates a service persisting with the standard one-year expiry.
    pub fn new(store: S) -> Self {
        Self::with_ttl(store, PERSIST_TTL)
    }

    pub fn with_ttl(store: S, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load sequence: classify entries, classify groups, then replay
    /// persisted preferences onto the classified page.
    pub fn bootstrap(&self, document: Document, reference_date: &str) -> ViewResult<AppState> {
        let mut state = AppState::new(document);
        classify_entries(&mut state.document, reference_date);
        classify_groups(&mut state.document);
        self.restore_from_persisted_state(&mut state)?;
        Ok(state)
    }

    /// Activates `mode` on the root container and persists it.
    pub fn set_view_mode(&self, state: &mut AppState, mode: ViewMode) -> ViewResult<()> {
        apply_view_mode(state, mode);
        self.persist(VIEW_MODE_KEY, mode.as_str())
    }

    /// Shows or hides entries tagged `name` and persists the choice.
    ///
    /// # Errors
    /// - `ViewError::InvalidToggleName` when `name` is not selector-safe;
    ///   nothing is changed in that case.
    /// - `ViewError::Store` when persisting fails; the page state is
    ///   already updated.
    pub fn set_toggle_visibility(
        &self,
        state: &mut AppState,
        name: &str,
        visible: bool,
    ) -> ViewResult<()> {
        let toggle = ToggleName::parse(name)?;
        let key = toggle_key(toggle.as_str());
        apply_toggle(state, toggle, visible);
        self.persist(&key, bool_text(visible))
    }

    /// Shows or hides past weeks and days in both layouts at once.
    pub fn set_past_visibility(&self, state: &mut AppState, visible: bool) -> ViewResult<()> {
        apply_past_visibility(state, visible);
        self.persist(SHOW_PAST_KEY, bool_text(visible))
    }

    /// Replays persisted preferences onto `state`.
    ///
    /// `viewmode` and `view_<name>` are saved again so their expiry restarts
    /// on every load; `showpast` is only read. Unknown keys and unknown view
    /// modes are ignored. A toggle value other than `true` means hidden.
    pub fn restore_from_persisted_state(&self, state: &mut AppState) -> ViewResult<RestoreSummary> {
        let mut summary = RestoreSummary::default();

        for (key, value) in self.store.entries()? {
            match replay_entry(state, &key, &value) {
                Replay::Ignored => {
                    debug!("event=prefs_restore module=view status=skip key={key}");
                    summary.ignored += 1;
                }
                Replay::Applied => summary.applied += 1,
                Replay::Resave(saved) => {
                    self.persist(&key, saved)?;
                    summary.applied += 1;
                    summary.refreshed += 1;
                }
            }
        }

        info!(
            "event=prefs_restore module=view status=ok applied={} refreshed={} ignored={}",
            summary.applied, summary.refreshed, summary.ignored
        );
        Ok(summary)
    }

    fn persist(&self, key: &str, value: &str) -> ViewResult<()> {
        if let Err(err) = self.store.set(key, value, self.ttl) {
            warn!("event=pref_persist module=view status=error key={key} error={err}");
            return Err(err.into());
        }
        debug!("event=pref_persist module=view status=ok key={key} value={value}");
        Ok(())
    }
}

enum Replay {
    Ignored,
    Applied,
    /// Applied; store this normalized value again under the same key.
    Resave(&'static str),
}

fn replay_entry(state: &mut AppState, key: &str, value: &str) -> Replay {
    if key == VIEW_MODE_KEY {
        let Some(mode) = ViewMode::parse(value) else {
            return Replay::Ignored;
        };
        apply_view_mode(state, mode);
        return Replay::Resave(mode.as_str());
    }

    if key == SHOW_PAST_KEY {
        apply_past_visibility(state, value == "true");
        return Replay::Applied;
    }

    if let Some(name) = key.strip_prefix(TOGGLE_KEY_PREFIX) {
        let Ok(toggle) = ToggleName::parse(name) else {
            return Replay::Ignored;
        };
        let visible = value == "true";
        apply_toggle(state, toggle, visible);
        return Replay::Resave(bool_text(visible));
    }

    Replay::Ignored
}

fn apply_view_mode(state: &mut AppState, mode: ViewMode) {
    let document = &mut state.document;
    document.root_classes.remove(mode.other().as_str());
    document.root_classes.insert(mode.as_str().to_string());

    let control_id = view_mode_control_id(mode);
    let already_checked = document
        .control_by_id(&control_id)
        .is_some_and(|control| control.checked);
    if !already_checked {
        document.set_checked_by_id(&control_id, true);
    }
    state.view_mode = Some(mode);
}

fn apply_toggle(state: &mut AppState, toggle: ToggleName, visible: bool) {
    state.document.set_toggle_checked(toggle.as_str(), visible);
    state.visibility.set_visible(toggle, visible);
}

fn apply_past_visibility(state: &mut AppState, visible: bool) {
    state.visibility.show_past = visible;
    state.document.set_checked_by_id(SHOW_PAST_CONTROL_ID, visible);
}

fn bool_text(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
