//! The decisions behind each CLI subcommand, kept apart from terminal output.

use crate::storage::UrlStore;
use crate::{UrlStatus, ui};
use chrono::NaiveDateTime;
use std::path::Path;

/// Output format for `stats`
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum StatsFormat {
    Text,
    Json,
}

/// Refuse to wipe an existing database unless the caller confirmed it
pub fn check_init_allowed(database: &Path, yes: bool) -> anyhow::Result<()> {
    if database.exists() && !yes {
        anyhow::bail!(
            "{} already exists and init drops every tracked URL (use --yes to confirm)",
            database.display()
        );
    }
    Ok(())
}

/// Open the database and recreate the table
pub fn run_init(database: &Path, yes: bool) -> anyhow::Result<UrlStore> {
    check_init_allowed(database, yes)?;

    tracing::info!("Setting up database");
    let store = UrlStore::open(database)?;
    store.reset_schema()?;
    Ok(store)
}

/// Set the status of a tracked URL, returning the value that was stored
pub fn run_mark(store: &UrlStore, url: &str, status: &str, now: NaiveDateTime) -> anyhow::Result<String> {
    if !store.update_status(url, status, now)? {
        anyhow::bail!("URL is not tracked: {}", url);
    }

    let stored = UrlStatus::normalize(status);
    tracing::debug!("Updated {} to {}", url, stored);
    Ok(stored)
}

/// Render the statistics report, optionally with every row
pub fn render_stats(
    store: &UrlStore,
    database: &Path,
    detailed: bool,
    format: StatsFormat,
) -> anyhow::Result<String> {
    let stats = store.stats()?;
    let rows = if detailed { store.all()? } else { Vec::new() };

    let rendered = match format {
        StatsFormat::Json => {
            let mut data = serde_json::json!({
                "database": database.display().to_string(),
                "stats": stats,
            });
            if detailed {
                data["urls"] = serde_json::to_value(&rows)?;
            }
            format!("{}\n", serde_json::to_string_pretty(&data)?)
        }
        StatsFormat::Text => {
            let counts: Vec<(String, String)> = std::iter::once(("Total".to_string(), stats.total.to_string()))
                .chain(stats.by_status.iter().map(|c| {
                    (c.status.clone().unwrap_or_else(|| "(none)".to_string()), c.count.to_string())
                }))
                .collect();
            let pairs: Vec<(&str, &str)> = counts.iter().map(|(l, v)| (l.as_str(), v.as_str())).collect();

            let mut text = format!("{} indexq statistics ({})\n", ui::Icons::STATS, database.display());
            text.push_str(&ui::stats_table(&pairs));
            text.push('\n');
            if detailed && !rows.is_empty() {
                text.push('\n');
                text.push_str(&ui::url_table(&rows));
                text.push('\n');
            }
            text
        }
    };

    Ok(rendered)
}

/// Write a report to `output`, or to stdout when there is none
pub fn write_report(rendered: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => std::fs::write(path, rendered)
            .map_err(|e| anyhow::anyhow!("cannot write {}: {}", path.display(), e))?,
        None => print!("{}", rendered),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(hour: u32) -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_init_refuses_existing_database() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("indexq.db");

        {
            let store = UrlStore::open(&db).unwrap();
            store.add_url("https://example.com/a", at(1)).unwrap();
        }

        assert!(check_init_allowed(&db, false).is_err());
        assert!(run_init(&db, false).is_err());

        let store = UrlStore::open(&db).unwrap();
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_init_with_confirmation_wipes_rows() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("indexq.db");

        {
            let store = UrlStore::open(&db).unwrap();
            store.add_url("https://example.com/a", at(1)).unwrap();
        }

        let store = run_init(&db, true).unwrap();
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_init_on_fresh_path_needs_no_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("fresh.db");

        check_init_allowed(&db, false).unwrap();
        let store = run_init(&db, false).unwrap();
        assert_eq!(store.index_names().unwrap().len(), 2);
    }

    #[test]
    fn test_mark_untracked_url_fails() {
        let store = UrlStore::open_in_memory().unwrap();
        let err = run_mark(&store, "https://example.com/missing", "sent_to_index", at(1)).unwrap_err();
        assert!(err.to_string().contains("not tracked"));
    }

    #[test]
    fn test_mark_stores_canonical_status() {
        let store = UrlStore::open_in_memory().unwrap();
        store.add_url("https://example.com/a", at(1)).unwrap();

        let stored = run_mark(&store, "https://example.com/a", "Sent", at(2)).unwrap();
        assert_eq!(stored, "sent_to_index");

        let row = store.get_by_url("https://example.com/a").unwrap().unwrap();
        assert_eq!(row.status.as_deref(), Some("sent_to_index"));
    }

    #[test]
    fn test_stats_written_to_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("indexq.db");
        let out = dir.path().join("stats.txt");

        let store = UrlStore::open(&db).unwrap();
        store.add_url("https://example.com/a", at(1)).unwrap();
        store.add_url("https://example.com/b", at(1)).unwrap();
        store.update_status("https://example.com/b", "sent_to_index", at(2)).unwrap();

        let rendered = render_stats(&store, &db, true, StatsFormat::Text).unwrap();
        write_report(&rendered, Some(&out)).unwrap();

        let written = std::fs::read_to_string(&out).unwrap();
        assert!(written.contains("Total"));
        assert!(written.contains("sent_to_index"));
        assert!(written.contains("https://example.com/a"));
    }

    #[test]
    fn test_stats_json() {
        let store = UrlStore::open_in_memory().unwrap();
        store.add_url("https://example.com/a", at(1)).unwrap();

        let rendered = render_stats(&store, Path::new("indexq.db"), false, StatsFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

        assert_eq!(value["stats"]["total"], 1);
        assert_eq!(value["stats"]["by_status"][0]["status"], "new");
        assert!(value.get("urls").is_none());
    }
}
