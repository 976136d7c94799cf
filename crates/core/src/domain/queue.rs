// Queue Domain Model

use crate::domain::import::PriorityClass;
use serde::{Deserialize, Serialize};

/// Number of jobs waiting per priority class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueDepth {
    pub high: usize,
    pub low: usize,
}

impl QueueDepth {
    pub fn total(&self) -> usize {
        self.high + self.low
    }

    pub fn of(&self, priority: PriorityClass) -> usize {
        match priority {
            PriorityClass::High => self.high,
            PriorityClass::Low => self.low,
        }
    }
}

/// Receipt returned when a job is admitted to the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Admission {
    pub priority: PriorityClass,
    pub sequence: u64,
    /// Depth of the job's class right after admission (including itself)
    pub depth: usize,
}
