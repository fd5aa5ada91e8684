//! `taggable` — administer tags in a SQLite database.
//!
//! Reads `taggable.toml` (or the path given with `--config`), opens the
//! database named by `store_path` (or `--db`), and runs one tagging command.
//!
//! # Usage
//!
//! ```text
//! taggable --db app.db enable posts
//! taggable --db app.db add posts 42 rust,sqlite
//! taggable --db app.db filter posts rust --limit 10
//! taggable --db app.db --json list posts 42
//! ```

mod commands;

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;
use commands::Command;
use serde::Deserialize;
use taggable_core::TaggableConfig;
use taggable_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(author, version, about = "Tag entities stored in a SQLite database")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "taggable.toml")]
  config: PathBuf,

  /// Database file; overrides `store_path` from the configuration.
  #[arg(long, env = "TAGGABLE_DB")]
  db: Option<PathBuf>,

  /// Print results as JSON.
  #[arg(long, global = true)]
  json: bool,

  #[command(subcommand)]
  command: Command,
}

// ─── Configuration ────────────────────────────────────────────────────────────

/// Settings deserialised from the config file and `TAGGABLE_*` variables.
#[derive(Deserialize, Debug)]
struct Settings {
  #[serde(default = "default_store_path")]
  store_path: PathBuf,
  #[serde(default)]
  tagging:    TaggableConfig,
}

fn default_store_path() -> PathBuf { PathBuf::from("taggable.db") }

fn load_settings(path: &Path) -> anyhow::Result<Settings> {
  config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(
      config::Environment::with_prefix("TAGGABLE")
        .prefix_separator("_")
        .separator("__"),
    )
    .build()
    .context("failed to read config file")?
    .try_deserialize()
    .context("failed to deserialise settings")
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let settings = load_settings(&cli.config)?;

  let store_path = expand_tilde(cli.db.as_deref().unwrap_or(&settings.store_path));
  tracing::debug!(path = %store_path.display(), "opening store");

  let store = SqliteStore::open_with_config(&store_path, settings.tagging)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  commands::run(store, cli.command, cli.json).await
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use clap::CommandFactory;

  use super::*;

  #[test]
  fn cli_definition_is_consistent() { Cli::command().debug_assert(); }

  #[test]
  fn parses_global_flags_and_subcommand() {
    let cli = Cli::try_parse_from([
      "taggable", "--db", "app.db", "add", "posts", "42", "rust,sqlite", "--json",
    ])
    .unwrap();

    assert_eq!(cli.db.as_deref(), Some(Path::new("app.db")));
    assert!(cli.json);
    assert!(matches!(
      cli.command,
      Command::Add { ref table, id: 42, ref tags }
        if table == "posts" && tags == &["rust,sqlite"]
    ));
  }

  #[test]
  fn add_requires_tags() {
    assert!(Cli::try_parse_from(["taggable", "add", "posts", "1"]).is_err());
  }

  #[test]
  fn missing_config_file_yields_defaults() {
    let settings =
      load_settings(Path::new("/nonexistent/taggable.toml")).unwrap();
    assert_eq!(settings.store_path, PathBuf::from("taggable.db"));
    assert_eq!(settings.tagging, TaggableConfig::default());
  }

  #[test]
  fn tilde_is_expanded() {
    if let Ok(home) = std::env::var("HOME") {
      assert_eq!(
        expand_tilde(Path::new("~/tags.db")),
        PathBuf::from(home).join("tags.db")
      );
    }
    assert_eq!(expand_tilde(Path::new("/tmp/x.db")), PathBuf::from("/tmp/x.db"));
  }
}
