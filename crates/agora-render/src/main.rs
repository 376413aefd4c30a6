use agora_render::{Event, FeedConfig, RendererRegistry, RenderingSurface};
use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, Command};
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Command::new("agora-replay")
        .version(agora_render::VERSION)
        .about("Replay a JSON Lines deliberation event log through the rendering feed")
        .arg(
            Arg::new("input")
                .value_parser(value_parser!(PathBuf))
                .help("Event log, one JSON event per line (stdin when omitted)"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_parser(value_parser!(PathBuf))
                .help("TOML feed configuration"),
        )
        .arg(
            Arg::new("cache-capacity")
                .long("cache-capacity")
                .value_parser(value_parser!(usize))
                .help("Override renderer cache capacity"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Print one JSON slot view per line"),
        )
        .arg(
            Arg::new("stats")
                .long("stats")
                .action(ArgAction::SetTrue)
                .help("Log resolver cache statistics when done"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .default_value("info")
                .help("Log filter used when RUST_LOG is unset"),
        );

    let matches = cli.get_matches();

    let log_level = matches
        .get_one::<String>("log-level")
        .map_or("info", String::as_str);
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => FeedConfig::from_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => FeedConfig::default(),
    };
    if let Some(capacity) = matches.get_one::<usize>("cache-capacity") {
        config = config.with_cache_capacity(*capacity);
    }

    let mut registry = RendererRegistry::new();
    agora_render::renderers::register_builtin_with(&mut registry, &config);
    let mut surface = RenderingSurface::from_config(registry, &config).context("invalid feed configuration")?;

    let pushed = match matches.get_one::<PathBuf>("input") {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("opening {}", path.display()))?;
            replay(BufReader::new(file), &mut surface).await?
        }
        None => replay(BufReader::new(tokio::io::stdin()), &mut surface).await?,
    };

    let settled = surface.settle_all().await;
    info!(pushed, settled, retained = surface.len(), "replay finished");

    let as_json = matches.get_flag("json");
    for slot in surface.views() {
        if as_json {
            println!("{}", serde_json::to_string(&slot)?);
        } else {
            print!("{}", slot.view);
            println!();
        }
    }

    if matches.get_flag("stats") {
        let stats = surface.resolver().stats();
        info!(
            hits = stats.hits,
            joined = stats.joined,
            misses = stats.misses,
            loads = stats.loads,
            load_failures = stats.load_failures,
            evictions = stats.evictions,
            unknown = stats.unknown,
            "resolver statistics"
        );
    }

    Ok(())
}

/// Push every decodable line; malformed lines are logged and skipped
async fn replay<R>(reader: R, surface: &mut RenderingSurface) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut line_no = 0_usize;
    let mut pushed = 0;
    while let Some(line) = lines.next_line().await.context("reading event log")? {
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }
        match Event::parse_line(&line) {
            Ok(event) => {
                surface.push(event);
                pushed += 1;
                surface.drain_ready();
            }
            Err(error) => warn!(line = line_no, %error, "skipping malformed event"),
        }
    }
    Ok(pushed)
}
