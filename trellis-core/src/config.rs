//! Runtime configuration.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default drain ceiling.
pub const DEFAULT_MAX_QUEUE: usize = 2000;

/// Default number of queue entries named in an overflow error.
pub const DEFAULT_OVERFLOW_WINDOW: usize = 10;

/// Tunables for a [`Runtime`](crate::reactive::Runtime).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Maximum number of task executions in one drain before the scheduler
    /// gives up with an overflow error.
    pub max_queue: usize,

    /// How many of the most recently queued tasks an overflow error names.
    pub overflow_window: usize,

    /// Whether callable containers may be observed and ignored.
    pub observe_callable: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_queue: DEFAULT_MAX_QUEUE,
            overflow_window: DEFAULT_OVERFLOW_WINDOW,
            observe_callable: true,
        }
    }
}

impl RuntimeConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_max_queue(mut self, max_queue: usize) -> Self {
        self.max_queue = max_queue;
        self
    }

    pub fn with_overflow_window(mut self, overflow_window: usize) -> Self {
        self.overflow_window = overflow_window;
        self
    }

    pub fn with_observe_callable(mut self, observe_callable: bool) -> Self {
        self.observe_callable = observe_callable;
        self
    }
}
