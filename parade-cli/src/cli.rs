use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, bail};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use inquire::{Select, Text};
use parade_core::{
    CardBoard, Config, EventQuery, EventType, LocationSuggester, ParadeApi, RecordId,
    ResultsAssembler, ResultsView, RiskCalculator, SourceId, SuggestionBatch,
    api::default_source_from_config,
    card_view,
    share::{Clipboard, ExportOutcome, ShareOutcome, export_report, share_results, share_url},
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::{clipboard::TerminalClipboard, render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "parade", version, about = "Will it rain on my parade? Hourly weather risk for your event")]
pub struct Cli {
    /// Data source for this run: "backend" or "open-meteo".
    #[arg(long, global = true, value_parser = parse_source)]
    pub source: Option<SourceId>,

    /// Backend base URL for this run, e.g. http://localhost:5000.
    #[arg(long, global = true)]
    pub api_base: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Pick a data source, backend URL and default event type.
    Configure,

    /// Show hourly weather risk and suggestions for an event.
    Check(CheckArgs),

    /// List place names matching the text.
    Search {
        /// At least three characters of a place name.
        query: String,
    },

    /// Read one edit of a place name per stdin line and print debounced suggestions.
    Suggest,
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Address or location name.
    pub location: String,

    /// Event date and local time, e.g. 2025-07-01T14:00.
    #[arg(long)]
    pub at: Option<String>,

    /// parade, concert, picnic, wedding, sports, festival, birthday, or anything else.
    #[arg(long)]
    pub event: Option<String>,

    /// Expand the card at this local time. Repeat to click several cards in turn.
    #[arg(long = "expand", value_name = "HH:MM")]
    pub expand: Vec<String>,

    /// Print the results as JSON instead of cards.
    #[arg(long)]
    pub json: bool,

    /// Save a report into this directory.
    #[arg(long, value_name = "DIR")]
    pub export: Option<PathBuf>,

    /// Share a link to this check.
    #[arg(long)]
    pub share: bool,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = Config::load()?;

        if let Some(source) = self.source {
            config.set_source(source);
        }
        if let Some(base) = &self.api_base {
            config.backend.base_url = base.clone();
        }

        match self.command {
            Command::Configure => configure(config),
            Command::Check(args) => check(&config, args).await,
            Command::Search { query } => search(&config, &query).await,
            Command::Suggest => suggest(&config).await,
        }
    }
}

fn parse_source(raw: &str) -> anyhow::Result<SourceId> {
    SourceId::try_from(raw)
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let current = config.source_id().unwrap_or(SourceId::Backend);
    let start = SourceId::all().iter().position(|id| *id == current).unwrap_or(0);
    let source = Select::new("Data source:", SourceId::all().to_vec())
        .with_starting_cursor(start)
        .prompt()?;
    config.set_source(source);

    if source == SourceId::Backend {
        let base = config.backend.base_url.clone();
        config.backend.base_url = Text::new("Backend base URL:").with_default(&base).prompt()?;
    }

    let share_base = config.share_base().to_string();
    let share_base = Text::new("Base URL for shared links:").with_default(&share_base).prompt()?;
    config.share_base_url = Some(share_base);

    let events = EventType::RECOGNIZED.to_vec();
    let start = config
        .default_event
        .as_deref()
        .and_then(|current| events.iter().position(|e| *e == current))
        .unwrap_or(0);
    let event = Select::new("Default event type:", events).with_starting_cursor(start).prompt()?;
    config.default_event = Some(event.to_string());

    let path = config.save()?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}

async fn check(config: &Config, args: CheckArgs) -> anyhow::Result<()> {
    let event = args.event.clone().or_else(|| config.default_event.clone()).unwrap_or_default();
    let query =
        EventQuery::parse(&args.location, args.at.as_deref().unwrap_or_default(), &event, &Local)?;

    let assembler = ResultsAssembler::new(
        default_source_from_config(config)?,
        RiskCalculator::new(config.thresholds.clone()),
    );

    eprintln!("Checking the skies over {}...", query.location);
    let view = assembler.assemble(&query).await?;

    let mut board = CardBoard::default();
    for label in &args.expand {
        let id = find_card(&view, label).ok_or_else(|| anyhow!("No hourly card at {label}"))?;
        board.toggle(id);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{}", render::results(&view, &board, &Local));
    }

    if let Some(dir) = &args.export {
        match export_report(&view, None, dir)? {
            ExportOutcome::Saved(path) => println!("Saved report to {}", path.display()),
            ExportOutcome::Fallback { path, notice } => {
                eprintln!("{notice}");
                println!("Saved report to {}", path.display());
            }
        }
    }

    if args.share {
        let url = share_url(config.share_base(), &query)?;
        let clipboard = TerminalClipboard::detect();
        let clipboard = clipboard.as_ref().map(|c| c as &dyn Clipboard);

        match share_results(&url, None, clipboard) {
            ShareOutcome::Shared => println!("Shared!"),
            ShareOutcome::Copied(url) => println!("Shareable link copied to clipboard: {url}"),
            ShareOutcome::Manual { url, reason } => {
                eprintln!("{reason}");
                println!("Share this link: {url}");
            }
        }
    }

    Ok(())
}

/// Accepts "14:00" or just "14".
fn normalize_label(label: &str) -> String {
    let label = label.trim();
    match label.split_once(':') {
        Some(_) => label.to_string(),
        None => format!("{label:0>2}:00"),
    }
}

fn find_card(view: &ResultsView, label: &str) -> Option<RecordId> {
    let label = normalize_label(label);
    view.cards
        .iter()
        .find(|state| card_view(state, false, &Local).time_label == label)
        .map(|state| state.id())
}

async fn search(config: &Config, query: &str) -> anyhow::Result<()> {
    let min = config.typeahead.min_chars;
    let query = query.trim();
    if query.chars().count() < min {
        bail!("Type at least {min} characters to search for a place");
    }

    let api = default_source_from_config(config)?;
    let found = api.search_locations(query).await?;

    if found.is_empty() {
        println!("No places match '{query}'");
    }
    for suggestion in found {
        println!("{}", suggestion.place_name);
    }
    Ok(())
}

async fn suggest(config: &Config) -> anyhow::Result<()> {
    let api = Arc::new(default_source_from_config(config)?);
    let (mut suggester, mut rx) = LocationSuggester::new(api, &config.typeahead);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    eprintln!("Type a place name, one edit per line (Ctrl-D to finish).");
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(text) => {
                    if !suggester.on_input(&text) {
                        debug!(input = %text, "input too short for suggestions");
                    }
                }
                None => break,
            },
            Some(batch) = rx.recv() => print_batch(&batch),
        }
    }

    suggester.finish();
    while let Some(batch) = rx.recv().await {
        print_batch(&batch);
    }
    Ok(())
}

fn print_batch(batch: &SuggestionBatch) {
    println!("{}:", batch.query);
    if batch.suggestions.is_empty() {
        println!("  (no matches)");
    }
    for suggestion in &batch.suggestions {
        println!("  {}", suggestion.place_name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn check_collects_repeated_expands() {
        let cli = Cli::try_parse_from([
            "parade", "check", "Paris", "--at", "2025-07-01T14:00", "--event", "picnic",
            "--expand", "13:00", "--expand", "14", "--source", "open-meteo",
        ])
        .unwrap();

        assert_eq!(cli.source, Some(SourceId::OpenMeteo));
        let Command::Check(args) = cli.command else {
            panic!("expected check");
        };
        assert_eq!(args.location, "Paris");
        assert_eq!(args.expand, vec!["13:00", "14"]);
        assert!(!args.json);
    }

    #[test]
    fn unknown_source_is_rejected_while_parsing() {
        let err = Cli::try_parse_from(["parade", "--source", "carrier-pigeon", "search", "Lon"])
            .unwrap_err();

        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
        assert!(err.to_string().contains("Unknown source 'carrier-pigeon'"));
    }

    #[test]
    fn labels_accept_bare_hours() {
        assert_eq!(normalize_label("9"), "09:00");
        assert_eq!(normalize_label("14"), "14:00");
        assert_eq!(normalize_label(" 14:00 "), "14:00");
    }
}
