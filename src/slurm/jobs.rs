use std::ops::Deref;

use super::snapshot::{RawJob, SlurmNumber};
use super::time::INFINITE;

pub const RUNNING: &str = "RUNNING";
pub const PENDING: &str = "PENDING";
pub const UNKNOWN: &str = "UNKNOWN";

/// A job augmented with elapsed, limit, and remaining time.
///
/// Negative elapsed or remaining times (clock skew, jobs running past their
/// limit) are kept as-is; see [`format_duration`](super::format_duration).
#[derive(Clone, Debug, PartialEq)]
pub struct EnrichedJob {
    pub raw: RawJob,
    /// Seconds since start (running) or since submission (pending); 0 otherwise
    pub time_used_sec: i64,
    /// Time limit in seconds or [`INFINITE`]
    pub time_limit_sec: i64,
    /// Seconds until the time limit for running jobs, [`INFINITE`] without a limit, 0 otherwise
    pub time_left_sec: i64,
}

impl EnrichedJob {
    pub fn new(raw: RawJob, reference_time: i64) -> Self {
        let state = primary_state(&raw.job_state);

        let time_used_sec = match state {
            RUNNING => reference_time.saturating_sub(epoch(raw.start_time)),
            PENDING => reference_time.saturating_sub(epoch(raw.submit_time)),
            _ => 0,
        };

        // Limits too large to express in seconds are as good as unlimited
        let time_limit_sec = match raw.time_limit.and_then(|v| v.value()) {
            Some(minutes) if minutes > 0 => minutes.checked_mul(60).unwrap_or(INFINITE),
            _ => INFINITE,
        };

        let time_left_sec = if time_limit_sec == INFINITE {
            INFINITE
        } else if state == RUNNING {
            time_limit_sec.saturating_sub(time_used_sec)
        } else {
            0
        };

        Self {
            raw,
            time_used_sec,
            time_limit_sec,
            time_left_sec,
        }
    }

    /// Returns the first state tag, or `UNKNOWN` if the job has none
    pub fn state(&self) -> &str {
        primary_state(&self.raw.job_state)
    }

    pub fn is_running(&self) -> bool {
        self.state() == RUNNING
    }

    pub fn is_pending(&self) -> bool {
        self.state() == PENDING
    }
}

impl Deref for EnrichedJob {
    type Target = RawJob;

    fn deref(&self) -> &Self::Target {
        &self.raw
    }
}

pub fn primary_state(tags: &[String]) -> &str {
    tags.first().map(String::as_str).unwrap_or(UNKNOWN)
}

fn epoch(value: Option<SlurmNumber>) -> i64 {
    value.and_then(|v| v.value()).unwrap_or_default()
}
