//! CLI entry point for `noticeboard`.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use clap::{CommandFactory, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use noticeboard::config::{self, Config};
use noticeboard::model::announcement::Announcement;
use noticeboard::search::sender_match::JaroWinkler;
use noticeboard::search::{SearchCriteria, SearchPipeline};
use noticeboard::stats;
use noticeboard::store::airtable::AirtableStore;
use noticeboard::store::memory::MemoryStore;
use noticeboard::store::AnnouncementStore;

#[derive(Parser)]
#[command(
    name = "noticeboard",
    version,
    about = "Search, filter and rank school announcements"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Read announcements from a local JSON export instead of Airtable
    #[arg(long, global = true, value_name = "FILE")]
    file: Option<PathBuf>,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// List announcements, newest first
    List {
        #[arg(long)]
        json: bool,
    },
    /// Search announcements by text, sender and/or date expression
    Search {
        /// Free-text query, ranked by relevance
        #[arg(short, long)]
        text: Option<String>,
        /// Sender name (case-insensitive substring)
        #[arg(short, long)]
        sender: Option<String>,
        /// Date expression: "in May", "last week", "2025-05-10", ...
        #[arg(short, long)]
        date: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Show one announcement in full
    Show {
        /// Record id; omit together with --latest
        #[arg(required_unless_present = "latest")]
        id: Option<String>,
        /// Show the most recently sent announcement instead
        #[arg(long, conflicts_with = "id")]
        latest: bool,
    },
    /// Show feed statistics
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

fn main() -> anyhow::Result<()> {
    let Cli {
        command,
        file,
        verbose,
    } = Cli::parse();

    // Load configuration
    let config = config::load_config();

    // Configure logging: stderr + optional log file
    let log_level = match verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    match command {
        Commands::List { json } => cmd_list(&file, &config, json),
        Commands::Search {
            text,
            sender,
            date,
            json,
        } => cmd_search(&file, &config, text, sender, date, json),
        Commands::Show { id, .. } => cmd_show(&file, &config, id),
        Commands::Stats { json } => cmd_stats(&file, &config, json),
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Manpage => cmd_manpage(),
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    // Try to set up file logging
    let log_dir = config::cache_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "noticeboard.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        // Fall back to stderr only
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Build the record store: a local JSON export when `--file` was given,
/// the configured Airtable base otherwise.
fn open_store(file: &Option<PathBuf>, config: &Config) -> anyhow::Result<Box<dyn AnnouncementStore>> {
    match file {
        Some(path) => Ok(Box::new(MemoryStore::from_json_file(path)?)),
        None => Ok(Box::new(AirtableStore::from_config(&config.airtable)?)),
    }
}

/// Spinner drawn to stderr while a store call is in flight.
fn fetch_spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// List every announcement, newest first.
fn cmd_list(file: &Option<PathBuf>, config: &Config, json: bool) -> anyhow::Result<()> {
    let store = open_store(file, config)?;

    let pb = fetch_spinner("Fetching announcements");
    let records = store.fetch_all()?;
    pb.finish_and_clear();

    let order = stats::sort_by_sent_time(&records, false);
    let sorted: Vec<Announcement> = order.into_iter().map(|i| records[i].clone()).collect();

    if json {
        let output = serde_json::json!({
            "count": sorted.len(),
            "announcements": sorted,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!();
        println!("  {} announcement(s)", sorted.len());
        println!();
        print_announcements_table(&sorted, &config.general.date_format);
    }
    Ok(())
}

/// Run the search pipeline and print the outcome.
fn cmd_search(
    file: &Option<PathBuf>,
    config: &Config,
    text: Option<String>,
    sender: Option<String>,
    date: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let store = open_store(file, config)?;

    let mut pipeline = SearchPipeline::new(store);
    if config.search.fuzzy_senders {
        pipeline = pipeline.with_fuzzy_sender(JaroWinkler {
            threshold: config.search.fuzzy_threshold,
        });
    }

    let criteria = SearchCriteria {
        search_text: text,
        sender_name: sender,
        date_query: date,
    };

    let pb = fetch_spinner("Searching");
    let outcome = pipeline.run(&criteria);
    pb.finish_and_clear();

    if json {
        let output = serde_json::json!({
            "count": outcome.count(),
            "message": &outcome.message,
            "error": &outcome.error,
            "announcements": &outcome.announcements,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    }

    if let Some(err) = &outcome.error {
        anyhow::bail!("{err}");
    }

    if !json {
        println!();
        println!("  {}", outcome.message);
        println!();
        print_announcements_table(&outcome.announcements, &config.general.date_format);
    }
    Ok(())
}

/// Show one announcement in full, by id or the newest one.
fn cmd_show(file: &Option<PathBuf>, config: &Config, id: Option<String>) -> anyhow::Result<()> {
    let store = open_store(file, config)?;

    let pb = fetch_spinner("Fetching announcement");
    let found = match &id {
        Some(id) => store.fetch_by_id(id)?,
        None => store.latest()?,
    };
    pb.finish_and_clear();

    match found {
        Some(a) => {
            print_announcement_detail(&a, &config.general.date_format);
            Ok(())
        }
        None => match id {
            Some(id) => anyhow::bail!("No announcement with id '{id}'"),
            None => anyhow::bail!("The feed is empty"),
        },
    }
}

/// Show feed statistics.
fn cmd_stats(file: &Option<PathBuf>, config: &Config, json: bool) -> anyhow::Result<()> {
    let store = open_store(file, config)?;

    let pb = fetch_spinner("Fetching announcements");
    let records = store.fetch_all()?;
    pb.finish_and_clear();

    if json {
        print_stats_json(&records)?;
    } else {
        print_stats_table(&records, &config.general.date_format);
    }
    Ok(())
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "noticeboard", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::stdout().write_all(&buf)?;
    Ok(())
}

/// Sent time formatted for tables; raw value when unparseable.
fn format_sent(raw: &str, date_format: &str) -> String {
    match noticeboard::parser::sent_time::parse(raw) {
        Some(t) => t.format(date_format).to_string(),
        None => raw.to_string(),
    }
}

/// Print announcements as a human-readable table.
fn print_announcements_table(records: &[Announcement], date_format: &str) {
    if records.is_empty() {
        return;
    }

    println!(
        "  {:<4} {:<17} {:<22} {:<42} {:>5}",
        "#", "Sent", "Sender", "Title", "Files"
    );
    println!("  {}", "-".repeat(94));

    for (i, a) in records.iter().enumerate() {
        let sender: String = a.sent_by.chars().take(21).collect();
        let title: String = a.title.chars().take(41).collect();
        println!(
            "  {:<4} {:<17} {:<22} {:<42} {:>5}",
            i + 1,
            format_sent(&a.sent_time, date_format),
            sender,
            title,
            a.attachments.len()
        );
    }
    println!();
}

/// Print one announcement in full.
fn print_announcement_detail(a: &Announcement, date_format: &str) {
    println!();
    println!("  {:<16} {}", "Title", a.title);
    println!("  {:<16} {}", "Sender", a.sent_by);
    println!("  {:<16} {}", "Sent", format_sent(&a.sent_time, date_format));
    if !a.id.is_empty() {
        println!("  {:<16} {}", "Record id", a.id);
    }
    if let Some(portal_id) = &a.announcement_id {
        println!("  {:<16} {}", "Announcement id", portal_id);
    }
    if !a.attachments.is_empty() {
        println!("  {:<16}", "Attachments");
        for att in &a.attachments {
            let name = if att.filename.is_empty() {
                "(unnamed)"
            } else {
                att.filename.as_str()
            };
            println!("    {name}  {}", att.url);
        }
    }
    println!();
    if !a.description.is_empty() {
        for line in a.description.lines() {
            println!("  {line}");
        }
        println!();
    }
}

/// Print feed statistics as a table.
fn print_stats_table(records: &[Announcement], date_format: &str) {
    println!();
    println!("  {:<20} {}", "Announcements", records.len());

    if let Some((min, max)) = stats::date_range(records) {
        println!(
            "  {:<20} {} to {}",
            "Date range",
            min.format("%Y-%m-%d"),
            max.format("%Y-%m-%d")
        );
    }

    let with_att = stats::count_with_attachments(records);
    println!(
        "  {:<20} {} ({:.1}%)",
        "With attachments",
        with_att,
        if records.is_empty() {
            0.0
        } else {
            with_att as f64 / records.len() as f64 * 100.0
        }
    );

    let order = stats::sort_by_sent_time(records, false);
    if let Some(&newest) = order.first() {
        println!(
            "  {:<20} {} ({})",
            "Newest",
            records[newest].title,
            format_sent(&records[newest].sent_time, date_format)
        );
    }

    let top = stats::top_senders(records, 10);
    if !top.is_empty() {
        println!();
        println!("  Top senders:");
        for (sender, count) in &top {
            println!("    {count:>6}  {sender}");
        }
    }
    println!();
}

/// Print feed statistics as JSON.
fn print_stats_json(records: &[Announcement]) -> anyhow::Result<()> {
    let date_range = stats::date_range(records).map(|(min, max)| {
        serde_json::json!({
            "oldest": min.to_rfc3339(),
            "newest": max.to_rfc3339(),
        })
    });

    let top = stats::top_senders(records, 10);
    let top_json: Vec<serde_json::Value> = top
        .iter()
        .map(|(sender, count)| {
            serde_json::json!({
                "sender": sender,
                "count": count,
            })
        })
        .collect();

    let output = serde_json::json!({
        "count": records.len(),
        "date_range": date_range,
        "with_attachments": stats::count_with_attachments(records),
        "top_senders": top_json,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
