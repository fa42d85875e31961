//! CLI command implementations
//!
//! Each command resolves the same context first: configuration, registry,
//! locator and batch date. Commands that touch a destination open it
//! themselves and drop it before returning.

use std::path::Path;

use chrono::{NaiveDate, Utc};
use serde_json::{json, Value};

use crate::config::{load_env_file, DestinationConfig, PipelineConfig};
use crate::destination::{Destination, MySqlDestination, SqliteDestination};
use crate::locator::{target_date, BatchLocator};
use crate::observability::{log_event_with_fields, Event};
use crate::pipeline::Pipeline;
use crate::producer;
use crate::schema::SchemaRegistry;
use crate::viewer::Viewer;

use super::args::{Command, CommonArgs, DestinationArgs};
use super::errors::{CliError, CliResult};
use super::io::write_response;

/// Everything a command needs before it does its own work
struct Context {
    config: PipelineConfig,
    registry: SchemaRegistry,
    locator: BatchLocator,
    batch_date: NaiveDate,
}

impl Context {
    fn pipeline(&self) -> Pipeline<'_> {
        Pipeline::new(&self.locator, &self.registry).with_namespace(self.config.namespace.clone())
    }

    fn date_label(&self) -> String {
        self.batch_date.format("%Y-%m-%d").to_string()
    }
}

/// Loads configuration and the registry, then fixes the batch date.
fn prepare(common: &CommonArgs) -> CliResult<Context> {
    let config = PipelineConfig::load_or_default(common.config.as_deref())?;
    let data_dir = config.data_dir.display().to_string();
    let lag = config.lag_days.to_string();
    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("data_dir", &data_dir),
            ("namespace", &config.namespace),
            ("lag_days", &lag),
        ],
    );

    let (registry, source) = match &config.registry_path {
        Some(path) => (SchemaRegistry::load(path)?, path.display().to_string()),
        None => (SchemaRegistry::phase1(), "builtin".to_string()),
    };
    let entities = registry.len().to_string();
    log_event_with_fields(
        Event::RegistryLoaded,
        &[("source", &source), ("entities", &entities)],
    );

    let batch_date = common
        .date
        .unwrap_or_else(|| target_date(Utc::now(), config.lag_days));
    let locator = BatchLocator::new(config.data_dir.clone());

    Ok(Context {
        config,
        registry,
        locator,
        batch_date,
    })
}

/// SQLite when `--sqlite` is given, MySQL from the environment otherwise.
fn open_destination(args: &DestinationArgs, namespace: &str) -> CliResult<Box<dyn Destination>> {
    match &args.sqlite {
        Some(path) => Ok(Box::new(SqliteDestination::open(path, namespace)?)),
        None => {
            let config = DestinationConfig::from_env()?;
            Ok(Box::new(MySqlDestination::connect(&config)?))
        }
    }
}

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    load_env_file(None);
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    let data = match cmd {
        Command::Generate {
            common,
            weather,
            seed,
        } => generate(&common, weather.as_deref(), seed)?,
        Command::Shred { common } => shred(&common)?,
        Command::Provision {
            common,
            destination,
        } => provision(&common, &destination)?,
        Command::Load {
            common,
            destination,
        } => load(&common, &destination)?,
        Command::Run {
            common,
            destination,
        } => run_batch(&common, &destination)?,
        Command::View {
            common,
            destination,
            entity,
            limit,
        } => view(&common, &destination, entity.as_deref(), limit)?,
    };

    write_response(data)
}

/// Writes the wide batch for the batch date.
pub fn generate(common: &CommonArgs, weather: Option<&Path>, seed: Option<u64>) -> CliResult<Value> {
    let ctx = prepare(common)?;
    let seed = seed.unwrap_or(ctx.config.seed);
    let batch = producer::produce(&ctx.locator, ctx.batch_date, seed, weather)?;

    Ok(json!({
        "batch_date": ctx.date_label(),
        "seed": seed,
        "rows": batch.len(),
        "columns": batch.columns(),
    }))
}

/// Shreds the wide batch into per-entity artifacts.
pub fn shred(common: &CommonArgs) -> CliResult<Value> {
    let ctx = prepare(common)?;
    let stage = ctx.pipeline().shred_stage(ctx.batch_date)?;

    Ok(json!({
        "batch_date": ctx.date_label(),
        "dir": stage.location.dir().display().to_string(),
        "manifest": stage.manifest,
    }))
}

/// Creates the registered entity tables.
pub fn provision(common: &CommonArgs, destination: &DestinationArgs) -> CliResult<Value> {
    let ctx = prepare(common)?;
    let mut dest = open_destination(destination, &ctx.config.namespace)?;
    let tables = ctx.pipeline().provision(&mut *dest)?;

    Ok(json!({
        "namespace": ctx.config.namespace,
        "backend": dest.backend(),
        "tables": tables,
    }))
}

/// Loads the artifacts already on disk for the batch date.
pub fn load(common: &CommonArgs, destination: &DestinationArgs) -> CliResult<Value> {
    let ctx = prepare(common)?;
    let mut dest = open_destination(destination, &ctx.config.namespace)?;
    let summary = ctx.pipeline().load_stage(&mut *dest, ctx.batch_date)?;

    Ok(serde_json::to_value(summary)?)
}

/// Shred then load.
pub fn run_batch(common: &CommonArgs, destination: &DestinationArgs) -> CliResult<Value> {
    let ctx = prepare(common)?;
    let mut dest = open_destination(destination, &ctx.config.namespace)?;
    let report = ctx.pipeline().run(&mut *dest, ctx.batch_date)?;

    Ok(serde_json::to_value(report)?)
}

/// Reads back up to `limit` rows per entity table.
pub fn view(
    common: &CommonArgs,
    destination: &DestinationArgs,
    entity: Option<&str>,
    limit: u32,
) -> CliResult<Value> {
    let ctx = prepare(common)?;
    if let Some(entity) = entity {
        ctx.registry
            .get(entity)
            .map_err(|e| CliError::invalid_argument(e.to_string()))?;
    }

    let mut dest = open_destination(destination, &ctx.config.namespace)?;
    let mut viewer = Viewer::new(&mut *dest).with_namespace(ctx.config.namespace.clone());
    let views = match entity {
        Some(entity) => vec![viewer.fetch(entity, limit)?],
        None => viewer.fetch_all(&ctx.registry, limit)?,
    };

    Ok(json!({
        "namespace": ctx.config.namespace,
        "limit": limit,
        "tables": views,
    }))
}
