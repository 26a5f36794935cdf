use schedule_view_core::db::open_db_in_memory;
use schedule_view_core::{
    AppState, Control, CookieJarStore, Document, Entry, Group, Node, PrefStore, SqlitePrefStore,
    ToggleName, ViewError, ViewMode, ViewStateService, PAST_HIDE_RULES, PERSIST_TTL,
};
use std::collections::HashMap;
use std::time::Duration;

fn schedule_page() -> Document {
    let mut document = Document {
        nodes: vec![
            Node::Group(Group::new(vec![
                Entry::dated("2024-06-10").with_tags(["lecture"]),
                Entry::dated("2024-06-12").with_tags(["lab"]),
            ])),
            Node::Group(Group::new(vec![
                Entry::dated("2024-06-17").with_tags(["lecture"]),
                Entry::dated("2024-06-19").with_tags(["exam"]),
            ])),
        ],
        controls: vec![
            Control::view_mode_radio(ViewMode::Calendar),
            Control::view_mode_radio(ViewMode::Agenda),
            Control::show_past_checkbox(),
            Control::toggle_checkbox("lecture"),
            Control::toggle_checkbox("lab"),
        ],
        ..Document::default()
    };
    document.root_classes.insert("calendar".to_string());
    document.controls[0].checked = true;
    document
}

#[test]
fn restore_applies_agenda_mode_and_hides_past() {
    let store = CookieJarStore::from_cookie_header("viewmode=agenda; showpast=false", PERSIST_TTL);
    let service = ViewStateService::new(store);

    let state = service.bootstrap(schedule_page(), "2024-06-15").unwrap();

    assert!(state.document.has_root_class("agenda"));
    assert!(!state.document.has_root_class("calendar"));
    assert_eq!(state.view_mode, Some(ViewMode::Agenda));
    assert!(state.document.control_by_id("viewmode=agenda").unwrap().checked);
    assert!(!state.document.control_by_id("viewmode=calendar").unwrap().checked);
    assert!(!state.document.control_by_id("showpast").unwrap().checked);

    let rules = state.hide_rules();
    for rule in PAST_HIDE_RULES {
        assert!(rules.iter().any(|active| active == rule), "missing {rule}");
    }
}

#[test]
fn bootstrap_classifies_before_replay() {
    let service = ViewStateService::new(CookieJarStore::new());
    let state = service.bootstrap(schedule_page(), "2024-06-15").unwrap();

    assert_eq!(
        state.document.today_entry().unwrap().date.as_deref(),
        Some("2024-06-17")
    );
    assert!(state.hide_rules().is_empty());
    assert_eq!(state.view_mode, Some(ViewMode::Calendar));
}

#[test]
fn repeated_toggle_is_idempotent() {
    let service = ViewStateService::new(CookieJarStore::new());
    let mut state = AppState::new(schedule_page());

    service
        .set_toggle_visibility(&mut state, "lecture", false)
        .unwrap();
    let once = state.hide_rules();
    service
        .set_toggle_visibility(&mut state, "lecture", false)
        .unwrap();

    assert_eq!(state.hide_rules(), once);
    assert_eq!(once, [".lecture { display: none; }"]);

    service
        .set_toggle_visibility(&mut state, "lecture", true)
        .unwrap();
    service
        .set_toggle_visibility(&mut state, "lecture", true)
        .unwrap();
    assert!(state.hide_rules().is_empty());
}

#[test]
fn toggling_one_name_leaves_other_rules_alone() {
    let service = ViewStateService::new(CookieJarStore::new());
    let mut state = AppState::new(schedule_page());

    service.set_toggle_visibility(&mut state, "lab", false).unwrap();
    service.set_past_visibility(&mut state, false).unwrap();
    service
        .set_toggle_visibility(&mut state, "lecture", true)
        .unwrap();
    service
        .set_toggle_visibility(&mut state, "lecture", false)
        .unwrap();

    let rules = state.hide_rules();
    assert_eq!(rules.len(), 6);
    assert!(rules.contains(&".lab { display: none; }".to_string()));
    assert!(rules.contains(&".lecture { display: none; }".to_string()));
    assert!(!state.document.toggle_control("lecture").unwrap().checked);
    assert!(!state.document.toggle_control("lab").unwrap().checked);
}

#[test]
fn past_rules_switch_together() {
    let service = ViewStateService::new(CookieJarStore::new());
    let mut state = AppState::new(schedule_page());

    service.set_past_visibility(&mut state, false).unwrap();
    service.set_past_visibility(&mut state, false).unwrap();
    assert_eq!(state.hide_rules(), PAST_HIDE_RULES);

    service.set_past_visibility(&mut state, true).unwrap();
    assert!(state.hide_rules().is_empty());
    assert!(state.document.control_by_id("showpast").unwrap().checked);
    assert_eq!(
        service.store().get("showpast").unwrap().as_deref(),
        Some("true")
    );
}

#[test]
fn set_view_mode_swaps_root_classes_and_persists() {
    let service = ViewStateService::new(CookieJarStore::new());
    let mut state = AppState::new(schedule_page());

    service.set_view_mode(&mut state, ViewMode::Agenda).unwrap();
    service.set_view_mode(&mut state, ViewMode::Agenda).unwrap();

    assert_eq!(
        state.document.root_classes.iter().collect::<Vec<_>>(),
        ["agenda"]
    );
    assert!(state.document.control_by_id("viewmode=agenda").unwrap().checked);
    assert_eq!(
        service.store().get("viewmode").unwrap().as_deref(),
        Some("agenda")
    );
}

#[test]
fn missing_controls_are_skipped() {
    let service = ViewStateService::new(CookieJarStore::new());
    let mut state = AppState::new(Document::default());

    service.set_view_mode(&mut state, ViewMode::Calendar).unwrap();
    service.set_past_visibility(&mut state, false).unwrap();
    service
        .set_toggle_visibility(&mut state, "seminar", false)
        .unwrap();

    assert!(state.document.has_root_class("calendar"));
    assert_eq!(state.hide_rules().len(), 5);
}

#[test]
fn invalid_toggle_name_changes_nothing() {
    let service = ViewStateService::new(CookieJarStore::new());
    let mut state = AppState::new(schedule_page());
    let before = state.clone();

    let err = service
        .set_toggle_visibility(&mut state, "lab, .day", false)
        .unwrap_err();

    assert!(matches!(err, ViewError::InvalidToggleName(_)));
    assert_eq!(state, before);
    assert!(service.store().entries().unwrap().is_empty());
}

#[test]
fn choices_round_trip_through_sqlite_store() {
    let conn = open_db_in_memory().unwrap();

    {
        let service = ViewStateService::new(SqlitePrefStore::new(&conn));
        let mut state = AppState::new(schedule_page());
        service.set_view_mode(&mut state, ViewMode::Agenda).unwrap();
        service.set_toggle_visibility(&mut state, "lab", false).unwrap();
        service.set_toggle_visibility(&mut state, "exam", false).unwrap();
        service.set_toggle_visibility(&mut state, "exam", true).unwrap();
    }

    let service = ViewStateService::new(SqlitePrefStore::new(&conn));
    let state = service.bootstrap(schedule_page(), "2024-06-15").unwrap();

    assert_eq!(state.view_mode, Some(ViewMode::Agenda));
    assert!(!state
        .visibility
        .is_visible(&ToggleName::parse("lab").unwrap()));
    assert!(state
        .visibility
        .is_visible(&ToggleName::parse("exam").unwrap()));
    assert_eq!(state.stylesheet(), ".lab { display: none; }\n");
}

#[test]
fn restore_skips_unknown_keys_and_syncs_toggle_checkbox() {
    let store = CookieJarStore::from_cookie_header(
        "theme=dark; viewmode=grid; view_lab=false; view_a.b=false",
        PERSIST_TTL,
    );
    let service = ViewStateService::new(store);
    let mut state = AppState::new(schedule_page());
    assert!(state.document.toggle_control("lab").unwrap().checked);

    let summary = service.restore_from_persisted_state(&mut state).unwrap();

    assert_eq!(summary.applied, 1);
    assert_eq!(summary.refreshed, 1);
    assert_eq!(summary.ignored, 3);
    assert_eq!(state.hide_rules(), [".lab { display: none; }"]);
    assert!(!state.document.toggle_control("lab").unwrap().checked);
    assert!(state.document.toggle_control("lecture").unwrap().checked);
    assert_eq!(state.view_mode, Some(ViewMode::Calendar));
}

#[test]
fn restore_reads_non_true_values_as_hidden() {
    let store =
        CookieJarStore::from_cookie_header("showpast=maybe; view_exam=yes", PERSIST_TTL);
    let service = ViewStateService::new(store);

    let state = service.bootstrap(schedule_page(), "2024-06-15").unwrap();

    assert!(!state.visibility.show_past);
    assert!(!state.document.control_by_id("showpast").unwrap().checked);
    assert!(state
        .hide_rules()
        .contains(&".exam { display: none; }".to_string()));
    assert_eq!(
        service.store().get("view_exam").unwrap().as_deref(),
        Some("false")
    );
}

#[test]
fn load_restarts_expiry_of_view_mode_and_toggles_only() {
    let conn = open_db_in_memory().unwrap();
    let store = SqlitePrefStore::new(&conn);
    let short = Duration::from_secs(60);
    store.set("viewmode", "agenda", short).unwrap();
    store.set("view_lab", "false", short).unwrap();
    store.set("showpast", "false", short).unwrap();
    let before = expiry_by_key(&store);

    let service = ViewStateService::new(SqlitePrefStore::new(&conn));
    let state = service.bootstrap(schedule_page(), "2024-06-15").unwrap();
    let after = expiry_by_key(service.store());

    let min_refreshed = before["viewmode"] + 300 * 24 * 60 * 60 * 1000;
    assert!(after["viewmode"] > min_refreshed);
    assert!(after["view_lab"] > min_refreshed);
    assert_eq!(after["showpast"], before["showpast"]);
    assert_eq!(
        service.store().get("viewmode").unwrap().as_deref(),
        Some("agenda")
    );
    assert_eq!(state.view_mode, Some(ViewMode::Agenda));
}

fn expiry_by_key(store: &SqlitePrefStore<'_>) -> HashMap<String, i64> {
    store
        .entries_with_expiry()
        .unwrap()
        .into_iter()
        .map(|pref| (pref.key, pref.expires_at_ms))
        .collect()
}
