//! Construction-time validation errors.
//!
//! Everything here is raised while a scheduling request is parsed and
//! validated, before any solver work starts. Solve outcomes are never
//! errors: infeasibility, timeouts, and pre-check failures come back as
//! statuses on [`ScheduleReport`](crate::models::ScheduleReport).

use thiserror::Error;

/// Errors raised while validating and parsing a scheduling request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// A time component was not `HH:MM` with integer fields.
    #[error("{context}: invalid time '{value}', expected HH:MM")]
    InvalidTime { context: String, value: String },

    /// A time range had no single en-dash or hyphen separator.
    #[error("{context}: invalid range '{value}', expected 'HH:MM-HH:MM'")]
    InvalidRange { context: String, value: String },

    /// A time range ended on or before its start.
    #[error("{context}: range '{value}' must end after it starts")]
    EmptyRange { context: String, value: String },

    /// The scheduling horizon contains no slots.
    #[error("schedule horizon '{0}' contains no slots")]
    EmptyHorizon(String),

    /// Employee count was zero.
    #[error("employee count must be at least 1")]
    NoEmployees,

    /// Maximum consecutive work minutes was zero.
    #[error("maximum consecutive work minutes must be positive")]
    ZeroWorkLimit,

    /// Post-work rest outside the supported durations.
    #[error("post-work rest must be 30 or 60 minutes, got {0}")]
    UnsupportedRest(u32),

    /// A requirement line did not match `<job code> <ranges>`.
    #[error("requirement line {line}: expected '<job code> <range>[,<range>...]', got '{text}'")]
    MalformedRequirement { line: usize, text: String },

    /// Mandatory break enabled with a zero minimum duration.
    #[error("mandatory break is enabled but the minimum break duration is zero")]
    ZeroBreakMinutes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_context() {
        let err = ScheduleError::InvalidTime {
            context: "break window".to_string(),
            value: "8h30".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("break window"));
        assert!(text.contains("8h30"));
    }

    #[test]
    fn test_requirement_error_names_line() {
        let err = ScheduleError::MalformedRequirement {
            line: 3,
            text: "A".to_string(),
        };
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn test_rest_error_names_value() {
        assert!(ScheduleError::UnsupportedRest(45).to_string().contains("45"));
    }
}
