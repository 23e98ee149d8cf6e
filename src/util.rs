use clap::ArgMatches;
use serde_json::json;
use tracing::info;

use crate::{
    catalog::TermCatalog,
    engine::{EngineConfig, ScheduleRun, Scheduler},
    error::Result,
    schedule::{slot_map, ScheduleRecord},
    search::Strategy,
    sink::{JsonFileSink, MemorySink},
};

/** parameters of a command line run */
#[derive(Debug)]
pub struct Params {
    /// catalog file name
    pub catalog_filename: String,
    /// term catalog (conflict facts + attributes)
    pub catalog: TermCatalog,
    /// engine configuration (its strategy is the one of the executable)
    pub config: EngineConfig,
    /// where to write the schedule
    pub schedule_file: Option<String>,
    /// where to write the run statistics
    pub perf_file: Option<String>,
}

/// installs the log subscriber (level from RUST_LOG, info by default)
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

/** reads command line input: the catalog, the optional configuration, and the output files */
pub fn read_params(main_args:&ArgMatches, strategy:Strategy) -> Result<Params> {
    let catalog_filename = main_args.value_of("catalog").unwrap_or_default().to_string();
    let mut config = match main_args.value_of("config") {
        None => EngineConfig::default(),
        Some(filename) => {
            info!("reading configuration: {}", filename);
            EngineConfig::from_file(filename)?
        }
    };
    config.strategy = strategy;
    let schedule_file = main_args.value_of("schedule").map(str::to_string);
    if let Some(f) = &schedule_file { info!("printing schedule in: {}", f); }
    let perf_file = main_args.value_of("perf").map(str::to_string);
    if let Some(f) = &perf_file { info!("printing perfs in: {}", f); }
    info!("reading catalog: {}...", catalog_filename);
    let catalog = TermCatalog::from_file(&catalog_filename)?;
    info!(courses = catalog.courses.len(), enrollments = catalog.enrollments.len(), "catalog loaded");
    Ok(Params { catalog_filename, catalog, config, schedule_file, perf_file })
}

/// runs the scheduler on the catalog and writes the schedule (if asked)
pub fn solve(params:&Params) -> Result<ScheduleRun> {
    let scheduler = Scheduler::new(params.config.clone());
    match &params.schedule_file {
        Some(filename) => scheduler.recompute(&params.catalog, &params.catalog, &JsonFileSink::new(filename)),
        None => scheduler.recompute(&params.catalog, &params.catalog, &MemorySink::default()),
    }
}

/// logs the schedule, slot by slot
pub fn display_schedule(records:&[ScheduleRecord]) {
    for (slot, entries) in slot_map(records) {
        let codes:Vec<&str> = entries.iter().map(|r| r.entity.as_str()).collect();
        if let Some(first) = entries.first() {
            info!("slot {:>3} | {} | {}", slot+1, first.descriptor, codes.join(", "));
        }
    }
}

/// exports run statistics to the perf file
pub fn export_results(params:&Params, run:&ScheduleRun) -> Result<()> {
    if let Some(filename) = &params.perf_file {
        let stats = json!({
            "inst_name": params.catalog_filename,
            "primal_list": vec![run.report.nb_colors],
            "time_searched": run.report.time_total,
            "report": run.report,
        });
        std::fs::write(filename, serde_json::to_string(&stats)?)?;
    }
    Ok(())
}
