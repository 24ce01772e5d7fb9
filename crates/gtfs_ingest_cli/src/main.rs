use std::cell::Cell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::Parser;
use serde::Serialize;
use tracing::info;

use gtfs_ingest_core::gtfs_model::GtfsDate;
use gtfs_ingest_core::{EntityKind, Feed, FeedInput, NoticeSeverity, ParseConfig, ProgressHandler};

#[derive(Debug, Parser)]
#[command(name = "gtfs-ingest")]
#[command(about = "Load a GTFS feed into memory and report what was kept, dropped and filtered")]
struct Args {
    /// Zip archive or directory holding the feed tables
    #[arg(short = 'i', long = "input")]
    input: PathBuf,

    /// JSON file with parse options; flags below override it
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Write the summary here instead of stdout
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    #[arg(short = 'p', long = "pretty")]
    pretty: bool,

    /// Prepended to every identifier read from the feed
    #[arg(long = "id-prefix", alias = "id_prefix")]
    id_prefix: Option<String>,

    #[arg(long = "use-default-on-error", alias = "use_default_on_error")]
    use_default_on_error: bool,

    #[arg(long = "drop-erroneous", alias = "drop_erroneous")]
    drop_erroneous: bool,

    /// Validate every row but keep no stop times, shape points or translations
    #[arg(long = "dry-run")]
    dry_run: bool,

    #[arg(long = "check-null-coordinates", alias = "check_null_coordinates")]
    check_null_coordinates: bool,

    /// Accept archives whose tables sit in a single subdirectory
    #[arg(long = "zip-fix", alias = "zip_fix")]
    zip_fix: bool,

    #[arg(long = "keep-extra-columns", alias = "keep_extra_columns")]
    keep_extra_columns: bool,

    #[arg(long = "normalize-route-types", alias = "normalize_route_types")]
    normalize_route_types: bool,

    /// Comma-separated route_type codes to keep
    #[arg(long = "route-types", alias = "route_types", value_delimiter = ',')]
    route_types: Option<Vec<i64>>,

    #[arg(long = "start-date", alias = "start_date")]
    start_date: Option<String>,

    #[arg(long = "end-date", alias = "end_date")]
    end_date: Option<String>,

    /// JSON file holding an array of rings of [lat, lon] vertices
    #[arg(long = "boundary")]
    boundary: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct LoadSummary {
    input: String,
    elapsed_ms: u128,
    agencies: usize,
    levels: usize,
    stops: usize,
    shapes: usize,
    shape_points: usize,
    routes: usize,
    services: usize,
    trips: usize,
    stop_times: usize,
    fare_attributes: usize,
    transfers: usize,
    pathways: usize,
    attributions: usize,
    translations: usize,
    dropped: BTreeMap<EntityKind, usize>,
    filtered: BTreeMap<EntityKind, usize>,
    notices: BTreeMap<String, usize>,
    warnings: usize,
}

impl LoadSummary {
    fn new(input: &Path, feed: &Feed, elapsed_ms: u128) -> Self {
        let mut notices: BTreeMap<String, usize> = BTreeMap::new();
        let mut warnings = 0;
        for notice in feed.notices().iter() {
            *notices.entry(notice.code.clone()).or_insert(0) += 1;
            if notice.severity == NoticeSeverity::Warning {
                warnings += 1;
            }
        }
        Self {
            input: input.display().to_string(),
            elapsed_ms,
            agencies: feed.agencies().len(),
            levels: feed.levels().len(),
            stops: feed.stops().len(),
            shapes: feed.shapes().len(),
            shape_points: feed.shape_point_count(),
            routes: feed.routes().len(),
            services: feed.services().len(),
            trips: feed.trips().len(),
            stop_times: feed.stop_time_count(),
            fare_attributes: feed.fare_attributes().len(),
            transfers: feed.transfers().len(),
            pathways: feed.pathways().len(),
            attributions: feed.attributions().len(),
            translations: feed.translation_count(),
            dropped: feed.dropped_counts().clone(),
            filtered: feed.filtered_counts().clone(),
            notices,
            warnings,
        }
    }
}

/// Logs each table as it starts and finishes.
#[derive(Default)]
struct LoggingProgress {
    total: Cell<usize>,
    done: Cell<usize>,
}

impl ProgressHandler for LoggingProgress {
    fn on_start_table(&self, table: &str) {
        tracing::debug!(table, "loading");
    }

    fn on_finish_table(&self, table: &str, retained: usize) {
        self.done.set(self.done.get() + 1);
        info!(
            "[{}/{}] {} ({} rows kept)",
            self.done.get(),
            self.total.get(),
            table,
            retained
        );
    }

    fn set_total_tables(&self, count: usize) {
        self.total.set(count);
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();
    let args = Args::parse();

    let config = build_config(&args)?;
    if !args.input.exists() {
        bail!("input {} does not exist", args.input.display());
    }
    info!("input {:?} detected", args.input);

    let started = Instant::now();
    let mut input = FeedInput::from_path(&args.input, config.zip_fix)
        .with_context(|| format!("failed to open {}", args.input.display()))?;
    let mut feed = Feed::new(config);
    let progress = LoggingProgress::default();
    feed.parse_input_with_progress(&mut input, args.id_prefix.as_deref(), &progress)
        .with_context(|| format!("failed to load {}", args.input.display()))?;
    let elapsed_ms = started.elapsed().as_millis();
    info!(
        "loaded {} trips and {} stop times in {} ms",
        feed.trips().len(),
        feed.stop_time_count(),
        elapsed_ms
    );

    let summary = LoadSummary::new(&args.input, &feed, elapsed_ms);
    let json = if args.pretty {
        serde_json::to_string_pretty(&summary)?
    } else {
        serde_json::to_string(&summary)?
    };
    match &args.output {
        Some(path) => std::fs::write(path, format!("{}\n", json))
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{}", json),
    }
    Ok(())
}

fn build_config(args: &Args) -> anyhow::Result<ParseConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            ParseConfig::from_json_str(&raw)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => ParseConfig::default(),
    };

    config.use_default_on_error |= args.use_default_on_error;
    config.drop_erroneous |= args.drop_erroneous;
    config.dry_run |= args.dry_run;
    config.check_null_coordinates |= args.check_null_coordinates;
    config.zip_fix |= args.zip_fix;
    config.keep_extra_columns |= args.keep_extra_columns;
    config.normalize_route_types |= args.normalize_route_types;
    if let Some(route_types) = &args.route_types {
        config.route_types = Some(route_types.clone());
    }
    if let Some(value) = args.start_date.as_deref() {
        config.start_date = Some(parse_date(value, "--start-date")?);
    }
    if let Some(value) = args.end_date.as_deref() {
        config.end_date = Some(parse_date(value, "--end-date")?);
    }
    if let (Some(start), Some(end)) = (config.start_date, config.end_date) {
        if start > end {
            bail!("start date {} is after end date {}", start, end);
        }
    }
    if let Some(path) = &args.boundary {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read boundary {}", path.display()))?;
        config.boundaries = serde_json::from_str(&raw)
            .with_context(|| format!("invalid boundary {}", path.display()))?;
    }
    Ok(config)
}

fn parse_date(value: &str, flag: &str) -> anyhow::Result<GtfsDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        bail!("{} cannot be empty", flag);
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y%m%d"))
        .map(GtfsDate::from_naive)
        .with_context(|| format!("invalid {} {}", flag, value))
}
