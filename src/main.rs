//! mojipick - search, browse and pick emoji from the command line
//!
//! ```text
//!   mojipick import
//!   mojipick search dog
//!   mojipick pick --tone medium 👍 👋
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use mojipick_config::{Config, ConfigManager};
use mojipick_core::{
    source_for, Catalog, CatalogStats, CategoryId, EmojiSource, ImportReport, PasteBuffer,
    SkinTone, StorePaths,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// mojipick - Emoji picker backend
#[derive(Parser, Debug)]
#[command(name = "mojipick")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file path
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the dataset and user stores
    #[arg(short = 'd', long, global = true)]
    data_dir: Option<PathBuf>,

    /// Language for names and keywords
    #[arg(short = 'l', long, global = true)]
    language: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Build the emoji dataset from emoji-test.txt
    Import {
        /// File or URL to read instead of the cached download
        #[arg(short = 's', long)]
        source: Option<String>,
    },

    /// List categories
    Categories,

    /// Search emoji by name or keyword
    Search {
        /// Category to browse when no text is given
        #[arg(short = 'C', long, default_value = "All")]
        category: String,

        /// Text to search for
        text: Option<String>,
    },

    /// Add or remove a favorite
    Favorite { glyph: String },

    /// Pick one or more emoji and print them as one string
    Pick {
        /// Skin tone (default, light, medium-light, medium, medium-dark, dark or 0-5)
        #[arg(short = 't', long)]
        tone: Option<String>,

        #[arg(required = true)]
        glyphs: Vec<String>,
    },

    /// Show or set personal search keywords
    Keywords {
        glyph: String,

        /// Replace the personal keywords (comma separated)
        #[arg(long, value_delimiter = ',')]
        set: Option<Vec<String>>,
    },

    /// List recently used emoji
    Recent,

    /// Show configuration
    Config {
        /// Print the effective configuration as TOML
        #[arg(long)]
        show: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let manager = match &args.config {
        Some(path) => ConfigManager::with_path(path)?,
        None => ConfigManager::new()?,
    };
    manager.update(|config| apply_args(config, &args));
    let config = manager.config();

    // Set up logging
    let log_level = if config.general.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("mojipick={}", log_level)),
        ))
        .init();

    tracing::debug!("Starting mojipick v{}", env!("CARGO_PKG_VERSION"));

    let language = config.general.effective_language();
    tracing::debug!("Using language {}", language);

    match args.command {
        Command::Config { show } => {
            if show {
                print!("{}", toml::to_string_pretty(&config)?);
            } else {
                println!("{}", manager.path().display());
            }
            Ok(())
        }
        Command::Import { source } => run_import(&config, source.as_deref()),
        command => {
            let mut catalog = Catalog::load(store_paths(&config), config.general.recent_limit());
            run(&mut catalog, &config, &language, command)
        }
    }
}

/// Command line flags take priority over the config file
fn apply_args(config: &mut Config, args: &Args) {
    if let Some(dir) = &args.data_dir {
        config.data.data_dir = Some(dir.clone());
    }
    if let Some(language) = &args.language {
        config.general.language = language.clone();
    }
    if args.debug {
        config.general.debug = true;
    }
}

fn store_paths(config: &Config) -> StorePaths {
    StorePaths {
        dataset: config.data.dataset_path(),
        overrides: config.data.overrides_path(),
        favorites: config.data.favorites_path(),
        recent: config.data.recent_path(),
    }
}

fn run_import(config: &Config, source: Option<&str>) -> anyhow::Result<()> {
    let mut catalog = Catalog::load(store_paths(config), config.general.recent_limit());
    let feed: Box<dyn EmojiSource> = source_for(
        source,
        &config.data.source_cache_path(),
        &config.data.source_url,
    );
    let (report, before) = rebuild(&mut catalog, feed.as_ref())?;
    let after = catalog.stats()?;

    println!(
        "Imported {} emoji in {} categories ({} overrides applied)",
        report.records, report.categories, report.overrides_applied
    );
    println!(
        "Skipped {} malformed and {} non fully-qualified lines",
        report.malformed, report.not_fully_qualified
    );
    println!(
        "Catalog: {} emoji (was {}), {} favorites, {} recent",
        after.total, before.total, after.favorites, after.recent
    );
    Ok(())
}

/// Re-import into the catalog's dataset and reload it
///
/// Returns the import report and the catalog's counts from before the import.
/// On failure the catalog is left loaded with the old dataset.
fn rebuild(
    catalog: &mut Catalog,
    feed: &dyn EmojiSource,
) -> anyhow::Result<(ImportReport, CatalogStats)> {
    let before = catalog.stats()?;
    let paths = catalog.paths().clone();
    let report =
        mojipick_core::import(feed, &paths.overrides, &paths.dataset).context("Import failed")?;

    catalog.invalidate();
    catalog.reload();
    Ok((report, before))
}

fn run(
    catalog: &mut Catalog,
    config: &Config,
    language: &str,
    command: Command,
) -> anyhow::Result<()> {
    match command {
        Command::Categories => {
            for category in catalog.categories()? {
                println!("{}", category);
            }
        }
        Command::Search { category, text } => {
            let category = CategoryId::parse(&category);
            let text = text.unwrap_or_default();
            for record in catalog.filter(&category, &text, language)? {
                println!(
                    "{}\t{}\t{}",
                    record.glyph,
                    record.shortcode,
                    record.display_name(language)
                );
            }
        }
        Command::Favorite { glyph } => {
            let applied = catalog.toggle_favorite(&glyph)?;
            let state = if applied.value { "added to" } else { "removed from" };
            println!("{} {} favorites{}", glyph, state, unsaved(applied.durable));
        }
        Command::Pick { tone, glyphs } => {
            let tone = parse_tone(tone.as_deref().unwrap_or(&config.general.skin_tone))?;
            let mut buffer = PasteBuffer::new();
            let mut durable = true;
            for glyph in &glyphs {
                let picked = buffer.push(glyph, tone);
                durable &= catalog.record_use(&picked)?.durable;
            }
            if !durable {
                tracing::warn!("Recent list could not be saved");
            }
            println!("{}", buffer.finish());
        }
        Command::Keywords { glyph, set } => {
            if let Some(words) = set {
                let applied = catalog.set_personal_keywords(&glyph, language, &words)?;
                println!(
                    "{}: {}{}",
                    glyph,
                    applied.value.join(", "),
                    unsaved(applied.durable)
                );
            } else {
                let personal = catalog.personal_keywords(&glyph, language)?;
                let defaults = catalog.default_keywords(&glyph, language)?;
                println!("personal: {}", personal.join(", "));
                println!("default: {}", defaults.join(", "));
            }
        }
        Command::Recent => {
            for glyph in catalog.recent()? {
                println!("{}", glyph);
            }
        }
        other @ (Command::Import { .. } | Command::Config { .. }) => {
            anyhow::bail!("{:?} does not run against a loaded catalog", other)
        }
    }
    Ok(())
}

fn parse_tone(value: &str) -> anyhow::Result<SkinTone> {
    value.parse().map_err(|e: String| anyhow::anyhow!(e))
}

fn unsaved(durable: bool) -> &'static str {
    if durable {
        ""
    } else {
        " (not saved)"
    }
}
