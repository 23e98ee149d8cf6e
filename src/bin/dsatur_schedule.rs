use clap::{App, ArgMatches, load_yaml};
use tracing::{error, info};

use timetable_color::error::Result;
use timetable_color::search::Strategy;
use timetable_color::util::{display_schedule, export_results, init_logging, read_params, solve};


/** schedules a term catalog using the DSATUR heuristic */
pub fn main() {
    init_logging();
    // parse arguments
    let yaml = load_yaml!("dsatur_schedule.yml");
    let main_args = App::from_yaml(yaml).get_matches();
    if let Err(e) = run(&main_args) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(main_args:&ArgMatches) -> Result<()> {
    let params = read_params(main_args, Strategy::Dsatur)?;
    let outcome = solve(&params)?;
    display_schedule(&outcome.records);
    info!(
        "{} slots for {} courses ({} conflicts, {} repairs)",
        outcome.report.nb_colors, outcome.records.len(), outcome.report.graph.nb_edges, outcome.report.repairs.len()
    );
    export_results(&params, &outcome)
}
