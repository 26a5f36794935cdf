//! Command-line driver for the schedule view core.
//!
//! Loads a page description (JSON), replays the stored preferences onto it,
//! and records new preferences in the SQLite store.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use log::info;
use schedule_view_core::db::open_db;
use schedule_view_core::{
    init_logging, reference_date_today, AppConfig, AppState, CookieJarStore, Document, PrefStore,
    SqlitePrefStore, StoreResult, StoredPref, ViewMode, ViewStateService,
};
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "schedule_view", version, about = "Schedule view state controller")]
struct Cli {
    /// Preference database (overrides SCHEDULE_VIEW_DB_PATH).
    #[arg(long)]
    db: Option<PathBuf>,
    /// Absolute directory for rolling log files (overrides SCHEDULE_VIEW_LOG_DIR).
    #[arg(long)]
    log_dir: Option<PathBuf>,
    /// trace|debug|info|warn|error (overrides SCHEDULE_VIEW_LOG_LEVEL).
    #[arg(long)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Classify a page, replay stored preferences and print the result.
    Show {
        document: PathBuf,
        /// Reference date (YYYY-MM-DD); defaults to the current UTC date.
        #[arg(long)]
        today: Option<String>,
    },
    /// Store the active layout.
    ViewMode {
        #[arg(value_parser = parse_view_mode)]
        mode: ViewMode,
    },
    /// Store whether past weeks and days are shown.
    ShowPast {
        #[arg(action = ArgAction::Set)]
        visible: bool,
    },
    /// Store whether entries tagged NAME are shown.
    Toggle {
        name: String,
        #[arg(action = ArgAction::Set)]
        visible: bool,
    },
    /// List stored preferences.
    Prefs,
    /// Print stored preferences as cookie lines.
    Cookies,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli);

    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, &log_dir.to_string_lossy())
            .map_err(anyhow::Error::msg)
            .context("failed to start logging")?;
    }

    let conn = open_db(&config.db_path).with_context(|| {
        format!(
            "failed to open preference database `{}`",
            config.db_path.display()
        )
    })?;
    let service = ViewStateService::new(SqlitePrefStore::new(&conn));
    info!(
        "event=cli_start module=cli status=ok db_path={}",
        config.db_path.display()
    );

    match cli.command {
        Command::Show { document, today } => show(&service, &document, today),
        Command::ViewMode { mode } => {
            service.set_view_mode(&mut AppState::default(), mode)?;
            println!("viewmode={mode}");
            Ok(())
        }
        Command::ShowPast { visible } => {
            service.set_past_visibility(&mut AppState::default(), visible)?;
            println!("showpast={visible}");
            Ok(())
        }
        Command::Toggle { name, visible } => {
            service.set_toggle_visibility(&mut AppState::default(), &name, visible)?;
            println!("view_{name}={visible}");
            Ok(())
        }
        Command::Prefs => {
            for line in pref_lines(&service.store().entries()?) {
                println!("{line}");
            }
            Ok(())
        }
        Command::Cookies => {
            for line in cookie_lines(&service.store().entries_with_expiry()?)? {
                println!("{line}");
            }
            Ok(())
        }
    }
}

fn resolve_config(cli: &Cli) -> AppConfig {
    let mut config = AppConfig::from_env();
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(log_dir) = &cli.log_dir {
        config.log_dir = Some(log_dir.clone());
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    config
}

fn show<S: PrefStore>(
    service: &ViewStateService<S>,
    path: &Path,
    today: Option<String>,
) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read document `{}`", path.display()))?;
    let document = Document::from_json(&text)
        .with_context(|| format!("invalid document `{}`", path.display()))?;
    let reference = today.unwrap_or_else(reference_date_today);

    let state = service.bootstrap(document, &reference)?;

    let root: Vec<&str> = state.document.root_classes.iter().map(String::as_str).collect();
    println!("reference: {reference}");
    println!("root: {}", root.join(" "));
    for entry in state.document.entries() {
        println!(
            "  {} {}",
            entry.date.as_deref().unwrap_or("-"),
            entry.label().unwrap_or("undated")
        );
    }
    print!("{}", state.stylesheet());
    Ok(())
}

fn pref_lines(entries: &[(String, String)]) -> Vec<String> {
    entries
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect()
}

/// Cookie lines carrying each preference's stored expiry.
fn cookie_lines(prefs: &[StoredPref]) -> StoreResult<Vec<String>> {
    Ok(CookieJarStore::from_stored(prefs)?.set_cookie_lines())
}

fn parse_view_mode(value: &str) -> Result<ViewMode, String> {
    ViewMode::parse(value).ok_or_else(|| format!("expected `calendar` or `agenda`, got `{value}`"))
}

#[cfg(test)]
mod tests {
    use super::{cookie_lines, parse_view_mode, pref_lines, Cli, Command};
    use clap::Parser;
    use schedule_view_core::db::open_db_in_memory;
    use schedule_view_core::{PrefStore, SqlitePrefStore, StoredPref, ViewMode, PERSIST_TTL};

    #[test]
    fn parses_toggle_with_boolean_value() {
        let cli = Cli::try_parse_from(["schedule_view", "toggle", "lab", "false"]).unwrap();
        match cli.command {
            Command::Toggle { name, visible } => {
                assert_eq!(name, "lab");
                assert!(!visible);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn view_mode_argument_is_validated() {
        assert_eq!(parse_view_mode("agenda"), Ok(ViewMode::Agenda));
        assert!(parse_view_mode("grid").is_err());
        assert!(Cli::try_parse_from(["schedule_view", "view-mode", "grid"]).is_err());
    }

    #[test]
    fn cookie_lines_print_stored_expiry() {
        let prefs = [StoredPref {
            key: "viewmode".to_string(),
            value: "agenda".to_string(),
            expires_at_ms: 4_102_444_800_000,
        }];

        assert_eq!(
            cookie_lines(&prefs).unwrap(),
            ["viewmode=agenda;expires=Fri, 01 Jan 2100 00:00:00 GMT"]
        );
    }

    #[test]
    fn cookie_lines_are_stable_for_unchanged_store() {
        let conn = open_db_in_memory().unwrap();
        let store = SqlitePrefStore::new(&conn);
        store.set("showpast", "false", PERSIST_TTL).unwrap();
        store.set("viewmode", "agenda", PERSIST_TTL).unwrap();

        let first = cookie_lines(&store.entries_with_expiry().unwrap()).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let second = cookie_lines(&store.entries_with_expiry().unwrap()).unwrap();

        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }

    #[test]
    fn pref_lines_print_key_value_pairs() {
        let conn = open_db_in_memory().unwrap();
        let store = SqlitePrefStore::new(&conn);
        store.set("viewmode", "calendar", PERSIST_TTL).unwrap();
        store.set("view_lab", "false", PERSIST_TTL).unwrap();

        assert_eq!(
            pref_lines(&store.entries().unwrap()),
            ["view_lab=false", "viewmode=calendar"]
        );
    }
}
