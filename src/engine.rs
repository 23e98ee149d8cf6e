//! Scheduling run: reads the conflict facts, builds the graph, colors it,
//! repairs it, assembles the schedule and hands it to the sink.
//!
//! The collaborators (fact source, attribute source, sink) are passed explicitly
//! to every run. A [`Scheduler`] serializes runs: two recomputations never
//! interleave their writes.

use std::fs;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use serde::{Serialize, Deserialize};
use tracing::{debug, info};

use crate::calendar::SlotCalendar;
use crate::color::{checker, CheckerResult, ColoringInstance, EntityId};
use crate::conflict::{ConflictGraphBuilder, ConflictOrigin, GraphStats};
use crate::error::{CollaboratorError, Error, Result};
use crate::repair::{repair, AttributeMap, Repair};
use crate::schedule::{assemble, ScheduleRecord};
use crate::search::Strategy;

/// unordered pairs of entity keys
pub type ConflictPairs = Vec<(EntityId, EntityId)>;

/** source of the conflict facts of a term. The three sets form one snapshot per run. */
pub trait ConflictSource {
    /// pairs of courses sharing at least one student
    fn student_overlaps(&self) -> std::result::Result<ConflictPairs, CollaboratorError>;

    /// pairs of courses sharing an instructor
    fn instructor_overlaps(&self) -> std::result::Result<ConflictPairs, CollaboratorError>;

    /// pairs of courses sharing a room
    fn room_overlaps(&self) -> std::result::Result<ConflictPairs, CollaboratorError>;
}

/** source of the entities and of their instructor / room */
pub trait AttributeSource {
    /// every known entity with its attributes
    fn entity_attributes(&self) -> std::result::Result<AttributeMap, CollaboratorError>;
}

/** receives the final schedule and replaces any previous one */
pub trait ScheduleSink {
    /// persists the records (one per entity)
    fn replace_schedule(&self, records:&[ScheduleRecord]) -> std::result::Result<(), CollaboratorError>;
}


/** configuration of the engine */
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// coloring heuristic
    #[serde(default)]
    pub strategy: Strategy,
    /// color to time block mapping
    #[serde(default)]
    pub calendar: SlotCalendar,
    /// if set, results of a run longer than this are discarded
    #[serde(default)]
    pub timeout_secs: Option<f32>,
}

impl EngineConfig {
    /// reads a JSON configuration file
    pub fn from_file(filename:&str) -> Result<Self> {
        let str = fs::read_to_string(filename)?;
        Ok(serde_json::from_str(&str)?)
    }

    /// time limit of a run (ignored if negative or not finite)
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.and_then(|s| Duration::try_from_secs_f32(s).ok())
    }
}


/** statistics of a run */
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// heuristic used
    pub strategy: Strategy,
    /// conflict graph statistics
    pub graph: GraphStats,
    /// colors used by the heuristic
    pub nb_colors_before_repair: usize,
    /// colors used after the repair
    pub nb_colors: usize,
    /// entities moved by the repair
    pub repairs: Vec<Repair>,
    /// time spent reading facts and building the graph (s)
    pub time_graph: f32,
    /// time spent coloring (s)
    pub time_coloring: f32,
    /// time spent validating and repairing (s)
    pub time_repair: f32,
    /// total time of the computation (s)
    pub time_total: f32,
    /// conflicts processed per second
    pub throughput: f64,
}

/** outcome of a run: the schedule and its statistics */
#[derive(Debug, Clone)]
pub struct ScheduleRun {
    /// one record per entity, in key order
    pub records: Vec<ScheduleRecord>,
    /// statistics
    pub report: RunReport,
}


/** computes a schedule without persisting it.

# Errors
 - `Collaborator` if a source fails
 - `ImproperColoring` / `RepairInvariant` on internal invariant violations
 - calendar errors while mapping colors to time blocks
*/
pub fn compute(
    config:&EngineConfig,
    facts:&dyn ConflictSource,
    attributes:&dyn AttributeSource,
) -> Result<ScheduleRun> {
    let t_start = Instant::now();
    // read the snapshot & build the graph
    let students = facts.student_overlaps()
        .map_err(|e| Error::collaborator("student_overlaps", e))?;
    let instructors = facts.instructor_overlaps()
        .map_err(|e| Error::collaborator("instructor_overlaps", e))?;
    let rooms = facts.room_overlaps()
        .map_err(|e| Error::collaborator("room_overlaps", e))?;
    let attributes = attributes.entity_attributes()
        .map_err(|e| Error::collaborator("entity_attributes", e))?;
    let mut builder = ConflictGraphBuilder::new();
    for entity in attributes.keys() {
        builder.add_entity(entity.as_str());
    }
    builder.add_conflicts(students, ConflictOrigin::StudentOverlap)
        .add_conflicts(instructors, ConflictOrigin::InstructorOverlap)
        .add_conflicts(rooms, ConflictOrigin::RoomOverlap);
    let graph = builder.build();
    graph.display_statistics();
    let time_graph = t_start.elapsed();

    // color
    let t_coloring = Instant::now();
    let colorer = config.strategy.colorer();
    let mut coloring = colorer.color(&graph);
    let nb_colors_before_repair = match checker(&graph, &coloring) {
        CheckerResult::Ok(n) => n,
        other => return Err(Error::ImproperColoring(format!("{}: {:?}", colorer.name(), other))),
    };
    let time_coloring = t_coloring.elapsed();
    debug!(strategy = colorer.name(), colors = nb_colors_before_repair, ?time_coloring, "coloring done");

    // validate & repair
    let t_repair = Instant::now();
    let repairs = repair(&graph, &attributes, &mut coloring)?;
    let time_repair = t_repair.elapsed();

    let records = assemble(&graph, &coloring, &config.calendar)?;
    let time_total = t_start.elapsed();
    let throughput = if time_total.as_secs_f64() > 0. {
        graph.nb_edges() as f64 / time_total.as_secs_f64()
    } else { 0. };
    let report = RunReport {
        strategy: config.strategy,
        graph: graph.statistics(),
        nb_colors_before_repair,
        nb_colors: coloring.nb_colors(),
        repairs,
        time_graph: time_graph.as_secs_f32(),
        time_coloring: time_coloring.as_secs_f32(),
        time_repair: time_repair.as_secs_f32(),
        time_total: time_total.as_secs_f32(),
        throughput,
    };
    info!(
        strategy = %report.strategy,
        colors = report.nb_colors,
        repairs = report.repairs.len(),
        "{} took {:.3} seconds", report.strategy, report.time_total
    );
    Ok(ScheduleRun { records, report })
}


/** runs the computation and the persistence as one critical section */
#[derive(Debug, Default)]
pub struct Scheduler {
    config: EngineConfig,
    lock: Mutex<()>,
}

impl Scheduler {
    /// creates a scheduler
    pub fn new(config:EngineConfig) -> Self {
        Self { config, lock: Mutex::new(()) }
    }

    /// configuration in use
    pub fn config(&self) -> &EngineConfig { &self.config }

    /** recomputes the schedule and replaces the persisted one.
    Concurrent calls are serialized. If the run exceeds the configured time limit,
    its result is discarded and the sink is not called.
    */
    pub fn recompute(
        &self,
        facts:&dyn ConflictSource,
        attributes:&dyn AttributeSource,
        sink:&dyn ScheduleSink,
    ) -> Result<ScheduleRun> {
        let t_start = Instant::now();
        // guards no data, poisoning is irrelevant
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let run = compute(&self.config, facts, attributes)?;
        if let Some(limit) = self.config.timeout() {
            let elapsed = t_start.elapsed();
            if elapsed > limit {
                return Err(Error::Timeout { elapsed, limit });
            }
        }
        sink.replace_schedule(&run.records)
            .map_err(|e| Error::collaborator("replace_schedule", e))?;
        debug!(records = run.records.len(), "schedule persisted");
        Ok(run)
    }
}
