use std::{cmp::Ordering, fmt, str::FromStr};

use crate::slurm::EnrichedJob;

/// Job field by which the job list can be sorted
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    JobId,
    UserName,
    JobState,
    Partition,
    Name,
    TimeUsed,
    TimeLimit,
    TimeLeft,
}

impl SortKey {
    pub const ALL: [SortKey; 8] = [
        SortKey::JobId,
        SortKey::UserName,
        SortKey::JobState,
        SortKey::Partition,
        SortKey::Name,
        SortKey::TimeUsed,
        SortKey::TimeLimit,
        SortKey::TimeLeft,
    ];

    /// Name of the field as used in the backend's job records
    pub fn field(&self) -> &'static str {
        match self {
            SortKey::JobId => "job_id",
            SortKey::UserName => "user_name",
            SortKey::JobState => "job_state",
            SortKey::Partition => "partition",
            SortKey::Name => "name",
            SortKey::TimeUsed => "time_used_sec",
            SortKey::TimeLimit => "time_limit_sec",
            SortKey::TimeLeft => "time_left_sec",
        }
    }

    /// Column header
    pub fn label(&self) -> &'static str {
        match self {
            SortKey::JobId => "Job ID",
            SortKey::UserName => "User",
            SortKey::JobState => "State",
            SortKey::Partition => "Partition",
            SortKey::Name => "Name",
            SortKey::TimeUsed => "Time Used",
            SortKey::TimeLimit => "Time Limit",
            SortKey::TimeLeft => "Time Left",
        }
    }

    /// Returns the key `delta` columns away, clamped to the first/last column
    pub fn offset(self, delta: isize) -> SortKey {
        let idx = SortKey::ALL.iter().position(|&v| v == self).unwrap_or_default();
        let idx = (idx as isize)
            .saturating_add(delta)
            .clamp(0, SortKey::ALL.len() as isize - 1);

        SortKey::ALL[idx as usize]
    }

    pub fn compare(&self, a: &EnrichedJob, b: &EnrichedJob) -> Ordering {
        match self {
            SortKey::JobId => a.job_id.cmp(&b.job_id),
            SortKey::UserName => a.user_name.cmp(&b.user_name),
            SortKey::JobState => a.job_state.cmp(&b.job_state),
            SortKey::Partition => a.partition.cmp(&b.partition),
            SortKey::Name => a.name.cmp(&b.name),
            SortKey::TimeUsed => a.time_used_sec.cmp(&b.time_used_sec),
            SortKey::TimeLimit => a.time_limit_sec.cmp(&b.time_limit_sec),
            SortKey::TimeLeft => a.time_left_sec.cmp(&b.time_left_sec),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self.label(), f)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown sort key {0:?}")]
pub struct SortKeyError(pub String);

impl FromStr for SortKey {
    type Err = SortKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .into_iter()
            .find(|key| key.field() == s)
            .ok_or_else(|| SortKeyError(s.to_string()))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggle(self) -> SortDirection {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// User controlled filtering and sorting of the job list
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewControls {
    pub filter_text: String,
    pub sort_key: SortKey,
    pub sort_dir: SortDirection,
}

impl ViewControls {
    /// Sorts by `key`; selecting the current key again flips the direction
    pub fn set_sort(&mut self, key: SortKey) {
        if self.sort_key == key {
            self.sort_dir = self.sort_dir.toggle();
        } else {
            self.sort_key = key;
            self.sort_dir = SortDirection::Ascending;
        }
    }

    pub fn set_filter(&mut self, text: &str) {
        self.filter_text = text.to_string();
    }

    /// Returns true if the job matches the (case-insensitive) filter text
    pub fn matches(&self, job: &EnrichedJob) -> bool {
        matches_filter(&self.filter_text.to_lowercase(), job)
    }
}

fn matches_filter(needle: &str, job: &EnrichedJob) -> bool {
    needle.is_empty()
        || job.user_name.to_lowercase().contains(needle)
        || job.name.to_lowercase().contains(needle)
        || job.partition.to_lowercase().contains(needle)
        || job.job_id.to_string().contains(needle)
}

/// Returns the jobs matching the filter, stably sorted by the selected key
pub fn project<'a>(jobs: &'a [EnrichedJob], controls: &ViewControls) -> Vec<&'a EnrichedJob> {
    let needle = controls.filter_text.to_lowercase();
    let mut jobs = jobs
        .iter()
        .filter(|job| matches_filter(&needle, job))
        .collect::<Vec<_>>();

    jobs.sort_by(|a, b| controls.sort_dir.apply(controls.sort_key.compare(a, b)));
    jobs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slurm::{RawJob, SlurmNumber};

    fn job(id: u64, user: &str, name: &str, partition: &str, limit: Option<i64>) -> EnrichedJob {
        EnrichedJob::new(
            RawJob {
                job_id: id,
                user_name: user.into(),
                job_state: vec!["RUNNING".into()],
                partition: partition.into(),
                name: name.into(),
                start_time: Some(SlurmNumber::new(0)),
                submit_time: Some(SlurmNumber::new(0)),
                time_limit: limit.map(SlurmNumber::new),
            },
            100 * id as i64,
        )
    }

    fn jobs() -> Vec<EnrichedJob> {
        vec![
            job(3, "alice", "train", "gpu", Some(60)),
            job(1, "bob", "sim", "cpu", None),
            job(2, "Alice", "eval", "gpu", Some(5)),
            job(10, "carol", "alice-data", "bigmem", Some(60)),
        ]
    }

    fn ids(jobs: &[&EnrichedJob]) -> Vec<u64> {
        jobs.iter().map(|j| j.job_id).collect()
    }

    fn controls(filter: &str, key: SortKey, dir: SortDirection) -> ViewControls {
        ViewControls {
            filter_text: filter.into(),
            sort_key: key,
            sort_dir: dir,
        }
    }

    #[test]
    fn test_sort_key_from_str() {
        for key in SortKey::ALL {
            assert_eq!(key.field().parse::<SortKey>(), Ok(key));
        }

        assert_eq!(
            "time".parse::<SortKey>(),
            Err(SortKeyError("time".to_string()))
        );
        assert!("".parse::<SortKey>().is_err());
    }

    #[test]
    fn test_sort_key_offset() {
        assert_eq!(SortKey::JobId.offset(-1), SortKey::JobId);
        assert_eq!(SortKey::JobId.offset(1), SortKey::UserName);
        assert_eq!(SortKey::TimeLeft.offset(1), SortKey::TimeLeft);
        assert_eq!(SortKey::Name.offset(isize::MAX), SortKey::TimeLeft);
        assert_eq!(SortKey::Name.offset(isize::MIN), SortKey::JobId);
    }

    #[test]
    fn test_set_sort() {
        let mut controls = ViewControls::default();
        assert_eq!(controls.sort_key, SortKey::JobId);
        assert_eq!(controls.sort_dir, SortDirection::Ascending);

        controls.set_sort(SortKey::JobId);
        assert_eq!(controls.sort_dir, SortDirection::Descending);

        controls.set_sort(SortKey::JobId);
        assert_eq!(controls.sort_dir, SortDirection::Ascending);

        controls.set_sort(SortKey::JobId);
        controls.set_sort(SortKey::Name);
        assert_eq!(controls.sort_key, SortKey::Name);
        assert_eq!(controls.sort_dir, SortDirection::Ascending);
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let jobs = jobs();
        let projected = project(&jobs, &ViewControls::default());
        assert_eq!(ids(&projected), vec![1, 2, 3, 10]);

        let matching = jobs.iter().filter(|j| ViewControls::default().matches(j));
        assert_eq!(matching.count(), jobs.len());
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let jobs = jobs();

        let projected = project(&jobs, &controls("alice", SortKey::JobId, SortDirection::Ascending));
        // Matches user names in either case as well as job names
        assert_eq!(ids(&projected), vec![2, 3, 10]);

        let projected = project(&jobs, &controls("ALICE", SortKey::JobId, SortDirection::Ascending));
        assert_eq!(ids(&projected), vec![2, 3, 10]);

        let projected = project(&jobs, &controls("bob", SortKey::JobId, SortDirection::Ascending));
        assert_eq!(ids(&projected), vec![1]);
    }

    #[test]
    fn test_filter_by_partition_and_id() {
        let jobs = jobs();

        let projected = project(&jobs, &controls("GPU", SortKey::JobId, SortDirection::Ascending));
        assert_eq!(ids(&projected), vec![2, 3]);

        let projected = project(&jobs, &controls("1", SortKey::JobId, SortDirection::Ascending));
        assert_eq!(ids(&projected), vec![1, 10]);

        let projected = project(&jobs, &controls("nothing", SortKey::JobId, SortDirection::Ascending));
        assert!(projected.is_empty());
    }

    #[test]
    fn test_sort_descending() {
        let jobs = jobs();
        let projected = project(&jobs, &controls("", SortKey::JobId, SortDirection::Descending));
        assert_eq!(ids(&projected), vec![10, 3, 2, 1]);
    }

    #[test]
    fn test_sort_by_strings() {
        let jobs = jobs();
        let projected = project(&jobs, &controls("", SortKey::UserName, SortDirection::Ascending));
        // Native ordering; upper-case letters sort first
        assert_eq!(ids(&projected), vec![2, 3, 1, 10]);

        let projected = project(&jobs, &controls("", SortKey::Name, SortDirection::Ascending));
        assert_eq!(ids(&projected), vec![10, 2, 1, 3]);
    }

    #[test]
    fn test_sort_by_time() {
        let jobs = jobs();

        let projected = project(&jobs, &controls("", SortKey::TimeUsed, SortDirection::Ascending));
        assert_eq!(ids(&projected), vec![1, 2, 3, 10]);

        // Infinite (-1) sorts before finite limits
        let projected = project(&jobs, &controls("", SortKey::TimeLimit, SortDirection::Ascending));
        assert_eq!(ids(&projected), vec![1, 2, 3, 10]);

        // Time left: 1 => -1, 2 => 300 - 200, 3 => 3600 - 300, 10 => 3600 - 1000
        let projected = project(&jobs, &controls("", SortKey::TimeLeft, SortDirection::Descending));
        assert_eq!(ids(&projected), vec![3, 10, 2, 1]);
    }

    #[test]
    fn test_sort_is_stable() {
        let jobs = jobs();

        // gpu jobs 3 and 2 tie, and keep their input order in both directions
        let projected = project(&jobs, &controls("", SortKey::Partition, SortDirection::Ascending));
        assert_eq!(ids(&projected), vec![10, 1, 3, 2]);

        let projected = project(&jobs, &controls("", SortKey::Partition, SortDirection::Descending));
        assert_eq!(ids(&projected), vec![3, 2, 1, 10]);
    }

    #[test]
    fn test_projection_is_idempotent() {
        let jobs = jobs();
        let controls = controls("", SortKey::JobId, SortDirection::Ascending);

        let first = project(&jobs, &controls)
            .into_iter()
            .cloned()
            .collect::<Vec<_>>();
        let second = project(&first, &controls)
            .into_iter()
            .cloned()
            .collect::<Vec<_>>();

        assert_eq!(first, second);
        assert_eq!(project(&jobs, &controls), project(&jobs, &controls));
    }
}
