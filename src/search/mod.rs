//! Coloring strategies for the conflict graph.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Deserialize};

use crate::color::{ColoringInstance, Coloring};
use crate::error::Error;

/// greedy DSATUR algorithm
pub mod greedy_dsatur;

/// greedy largest-first algorithm
pub mod greedy_largest_first;

use greedy_dsatur::greedy_dsatur;
use greedy_largest_first::greedy_largest_first;


/** a coloring heuristic: produces a proper coloring of a conflict graph */
pub trait Colorer: fmt::Debug + Send + Sync {
    /// name used in logs and reports
    fn name(&self) -> &'static str;

    /// colors every vertex of the instance
    fn color(&self, inst:&dyn ColoringInstance) -> Coloring;
}

/// DSATUR (saturation degree, then degree, then key)
#[derive(Debug, Clone, Copy, Default)]
pub struct Dsatur;

impl Colorer for Dsatur {
    fn name(&self) -> &'static str { "dsatur" }

    fn color(&self, inst:&dyn ColoringInstance) -> Coloring { greedy_dsatur(inst) }
}

/// largest-first greedy (static degree order)
#[derive(Debug, Clone, Copy, Default)]
pub struct LargestFirst;

impl Colorer for LargestFirst {
    fn name(&self) -> &'static str { "largest_first" }

    fn color(&self, inst:&dyn ColoringInstance) -> Coloring { greedy_largest_first(inst) }
}


/** coloring strategy selectable from the configuration or the command line */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// see [`Dsatur`]
    Dsatur,
    /// see [`LargestFirst`]
    LargestFirst,
}

impl Default for Strategy {
    fn default() -> Self { Strategy::Dsatur }
}

impl Strategy {
    /// colorer implementing the strategy
    pub fn colorer(&self) -> Box<dyn Colorer> {
        match self {
            Strategy::Dsatur => Box::new(Dsatur),
            Strategy::LargestFirst => Box::new(LargestFirst),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.colorer().name())
    }
}

impl FromStr for Strategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dsatur" => Ok(Strategy::Dsatur),
            "largest_first" | "greedy" => Ok(Strategy::LargestFirst),
            _ => Err(Error::Parse(format!("unknown coloring strategy {}", s))),
        }
    }
}
