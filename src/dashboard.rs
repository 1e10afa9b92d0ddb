use std::rc::Rc;

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use crate::slurm::{EnrichedJob, FetchError, Payload, Snapshot};
use crate::view::{project, SortKey, ViewControls};

/// State of the dashboard for a single cluster: the latest snapshot and the
/// user's filter/sort settings. Snapshots are only ever replaced as a whole.
#[derive(Debug)]
pub struct Dashboard {
    /// Name of the cluster as known by the backend
    pub host: String,
    snapshot: Rc<Snapshot>,
    controls: ViewControls,
    /// Message of the last failed refresh; cleared on success
    error: Option<String>,
    /// Local time of the last successful refresh
    loaded_at: Option<DateTime<Local>>,
}

impl Dashboard {
    pub fn new(host: &str) -> Self {
        Self {
            host: host.to_string(),
            snapshot: Rc::default(),
            controls: ViewControls::default(),
            error: None,
            loaded_at: None,
        }
    }

    /// Applies the outcome of a fetch. On failure the current snapshot is kept.
    pub fn apply(&mut self, result: Result<Payload, FetchError>) {
        match result {
            Ok(payload) => self.load(payload, Local::now()),
            Err(error) => {
                warn!(host = %self.host, %error, "refresh failed");
                self.error = Some(error.to_string());
            }
        }
    }

    /// Replaces the snapshot with one derived from `payload`
    pub fn load(&mut self, payload: Payload, now: DateTime<Local>) {
        let snapshot = Snapshot::from_payload(payload, now.timestamp());
        info!(
            host = %self.host,
            jobs = snapshot.jobs.len(),
            partitions = snapshot.partitions.len(),
            running = snapshot.summary.running_count,
            pending = snapshot.summary.pending_count,
            "loaded snapshot"
        );

        self.snapshot = Rc::new(snapshot);
        self.error = None;
        self.loaded_at = Some(now);
    }

    pub fn snapshot(&self) -> Rc<Snapshot> {
        self.snapshot.clone()
    }

    pub fn controls(&self) -> &ViewControls {
        &self.controls
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn loaded_at(&self) -> Option<DateTime<Local>> {
        self.loaded_at
    }

    /// Jobs of the current snapshot after filtering and sorting
    pub fn projected(&self) -> Vec<&EnrichedJob> {
        project(&self.snapshot.jobs, &self.controls)
    }

    pub fn set_filter(&mut self, text: &str) {
        self.controls.set_filter(text);
        debug!(filter = %self.controls.filter_text, "filter changed");
    }

    pub fn push_filter_char(&mut self, c: char) {
        self.controls.filter_text.push(c);
        debug!(filter = %self.controls.filter_text, "filter changed");
    }

    pub fn pop_filter_char(&mut self) {
        self.controls.filter_text.pop();
        debug!(filter = %self.controls.filter_text, "filter changed");
    }

    pub fn clear_filter(&mut self) {
        self.set_filter("");
    }

    /// Sorts by `key`, flipping the direction if `key` is already selected
    pub fn set_sort(&mut self, key: SortKey) {
        self.controls.set_sort(key);
        debug!(key = key.field(), direction = ?self.controls.sort_dir, "sort changed");
    }

    /// Flips the direction of the current sort key
    pub fn toggle_sort_direction(&mut self) {
        self.set_sort(self.controls.sort_key);
    }
}
