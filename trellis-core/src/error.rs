//! Error types for the reactive engine.

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the public entry points and by task execution.
///
/// Argument errors are raised before any side effect takes place. Task and
/// overflow errors propagate through whichever write or registration started
/// the drain, after the scheduler has been reset.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A value of the wrong kind was passed to a public entry point.
    #[error("{0}")]
    InvalidArgument(String),

    /// `dispose` was called without a task outside of any running task.
    #[error("Attempted to dispose of the current computed task outside of a computed task")]
    NoActiveTask,

    /// The drain exceeded its execution ceiling, most likely because two
    /// tasks keep re-triggering each other.
    #[error("Computed queue overflow after {limit} executions! Last tasks in the queue:{}", format_recent(.recent))]
    Overflow {
        /// The configured ceiling that was exceeded.
        limit: usize,
        /// `"<position>: <name>"` entries for the tail of the queue.
        recent: Vec<String>,
    },

    /// Attempted to redefine a slot that is not configurable.
    #[error("Cannot redefine non-configurable property {0:?}")]
    NonConfigurable(String),

    /// Failure raised from inside a task body.
    #[error("{0}")]
    Task(Box<dyn std::error::Error>),

    /// Configuration could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Build a task failure from any error or message.
    pub fn task(err: impl Into<Box<dyn std::error::Error>>) -> Self {
        Error::Task(err.into())
    }

    pub(crate) fn invalid(message: &str) -> Self {
        Error::InvalidArgument(message.to_string())
    }
}

fn format_recent(recent: &[String]) -> String {
    recent.iter().map(|line| format!("\n{line}")).collect()
}

pub(crate) const MESSAGE_NOT_OBJECT: &str = "Attempted to observe a value that is not an object";
pub(crate) const MESSAGE_NOT_FUNCTION: &str =
    "Attempted to register a value that is not a function as a computed task";
pub(crate) const MESSAGE_DISPOSE_NOT_FUNCTION: &str =
    "Attempted to dispose of a value that is not a function";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_message_lists_recent_tasks() {
        let err = Error::Overflow {
            limit: 2000,
            recent: vec!["1999: ping".to_string(), "2000: pong".to_string()],
        };

        let message = err.to_string();
        assert!(message.starts_with("Computed queue overflow after 2000 executions!"));
        assert!(message.ends_with("\n1999: ping\n2000: pong"));
    }

    #[test]
    fn task_error_keeps_message() {
        let err = Error::task("Oops!");
        assert_eq!(err.to_string(), "Oops!");
    }

    #[test]
    fn json_errors_convert() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = parse.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
