//! Conflict-free course timetabling by graph coloring.
//!
//! Conflicts between course offerings (shared students, shared instructor, shared room)
//! are merged into a conflict graph, colored with DSATUR or a largest-first greedy,
//! validated against the instructor and room of each course, then mapped to time slots.

// #![warn(clippy::all, clippy::pedantic)]
// useful additional warnings if docs are missing, or crates imported but unused, etc.
#![warn(missing_debug_implementations)]
#![warn(missing_docs)]
#![warn(trivial_casts, trivial_numeric_casts)]
#![warn(unsafe_code)]
#![warn(unused_extern_crates)]

// not sure if already by default in clippy
#![warn(clippy::similar_names)]


/// coloring instance base trait, colorings and checker
pub mod color;

/// conflict origins, conflict graph and its builder
pub mod conflict;

/// coloring heuristics (DSATUR, largest-first)
pub mod search;

/// validation and repair of a coloring against instructors and rooms
pub mod repair;

/// mapping from colors to time slots
pub mod calendar;

/// assembly of the final schedule
pub mod schedule;

/// scheduling runs, collaborator interfaces and configuration
pub mod engine;

/// in-memory term catalog (conflict facts + attributes)
pub mod catalog;

/// schedule sinks (memory, JSON file)
pub mod sink;

/// errors
pub mod error;

/// helper and utility methods for executables
pub mod util;
