use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use crate::engine::ScheduleSink;
use crate::error::CollaboratorError;
use crate::schedule::ScheduleRecord;

/** keeps the last schedule in memory */
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<ScheduleRecord>>,
    nb_writes: Mutex<usize>,
}

impl MemorySink {
    /// last schedule written
    pub fn records(&self) -> Vec<ScheduleRecord> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// number of schedules written so far
    pub fn nb_writes(&self) -> usize {
        *self.nb_writes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ScheduleSink for MemorySink {
    fn replace_schedule(&self, records:&[ScheduleRecord]) -> Result<(), CollaboratorError> {
        *self.records.lock().unwrap_or_else(PoisonError::into_inner) = records.to_vec();
        *self.nb_writes.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }
}


/** writes the schedule as a JSON array, replacing the file */
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    /// sink writing in the given file
    pub fn new(path:impl Into<PathBuf>) -> Self { Self { path: path.into() } }

    /// reads back a schedule written by this sink
    pub fn read(&self) -> Result<Vec<ScheduleRecord>, CollaboratorError> {
        let str = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&str)?)
    }
}

impl ScheduleSink for JsonFileSink {
    fn replace_schedule(&self, records:&[ScheduleRecord]) -> Result<(), CollaboratorError> {
        fs::write(&self.path, serde_json::to_string_pretty(records)?)?;
        Ok(())
    }
}
