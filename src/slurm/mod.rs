mod fetch;
mod jobs;
mod partitions;
mod snapshot;
mod summary;
mod time;

pub use fetch::{parse_payload, CommandFetcher, FetchError, FetchService, HttpFetcher};
pub use jobs::{primary_state, EnrichedJob, PENDING, RUNNING, UNKNOWN};
pub use partitions::{NodeTag, PartitionGroup, StateClass};
pub use snapshot::{
    Payload, RawJob, RawNodeCount, RawNodeState, RawPartitionGroup, RawPartitionName,
    SinfoReport, SlurmNumber, SqueueReport,
};
pub use summary::{ClusterAggregates, UserCount, UNKNOWN_PARTITION};
pub use time::{format_duration, INFINITE};

/// Jobs, partitions, and statistics derived from a single fetch
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    /// Reference time in epoch seconds
    pub timestamp: i64,
    pub jobs: Vec<EnrichedJob>,
    pub summary: ClusterAggregates,
    pub partitions: Vec<PartitionGroup>,
}

impl Snapshot {
    /// Enriches every job relative to `timestamp` and recomputes all statistics
    pub fn normalize(
        jobs: Vec<RawJob>,
        partitions: Vec<RawPartitionGroup>,
        timestamp: i64,
    ) -> Self {
        let jobs = jobs
            .into_iter()
            .map(|job| EnrichedJob::new(job, timestamp))
            .collect::<Vec<_>>();

        Self {
            timestamp,
            summary: ClusterAggregates::collect(&jobs),
            jobs,
            partitions: partitions.into_iter().map(PartitionGroup::from).collect(),
        }
    }

    /// Normalizes a backend payload, using `now` if the payload carries no timestamp
    pub fn from_payload(payload: Payload, now: i64) -> Self {
        let timestamp = payload
            .squeue
            .last_update
            .and_then(|v| v.value())
            .unwrap_or(now);

        Self::normalize(payload.squeue.jobs, payload.sinfo.sinfo, timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: u64, user: &str, partition: &str, state: &str) -> RawJob {
        RawJob {
            job_id: id,
            user_name: user.into(),
            job_state: vec![state.into()],
            partition: partition.into(),
            start_time: Some(SlurmNumber::new(100)),
            submit_time: Some(SlurmNumber::new(50)),
            ..Default::default()
        }
    }

    #[test]
    fn test_normalize() {
        let jobs = vec![
            raw(1, "a", "p1", "RUNNING"),
            raw(2, "b", "p1", "PENDING"),
            raw(3, "a", "p2", "RUNNING"),
        ];
        let partitions = vec![RawPartitionGroup {
            partition: RawPartitionName { name: "p1".into() },
            node: RawNodeState {
                state: vec!["IDLE".into()],
            },
            nodes: RawNodeCount { total: 2 },
        }];

        let snapshot = Snapshot::normalize(jobs.clone(), partitions, 150);
        assert_eq!(snapshot.jobs.len(), jobs.len());
        for (enriched, raw) in snapshot.jobs.iter().zip(&jobs) {
            assert_eq!(&enriched.raw, raw);
        }

        assert_eq!(snapshot.jobs[0].time_used_sec, 50);
        assert_eq!(snapshot.jobs[1].time_used_sec, 100);
        assert_eq!(snapshot.summary.running_count, 2);
        assert_eq!(snapshot.summary.pending_count, 1);
        assert_eq!(snapshot.summary.unique_user_count, 2);
        assert_eq!(snapshot.partitions.len(), 1);
        assert_eq!(snapshot.partitions[0].nodes, 2);
    }

    #[test]
    fn test_duplicate_jobs_are_kept() {
        let jobs = vec![raw(1, "a", "p", "RUNNING"), raw(1, "a", "p", "RUNNING")];
        let snapshot = Snapshot::normalize(jobs, Vec::new(), 0);
        assert_eq!(snapshot.jobs.len(), 2);
    }

    #[test]
    fn test_malformed_job_keeps_siblings() {
        let payload = parse_payload(
            r#"{"status": "ok", "squeue": {"last_update": {"number": 100}, "jobs": [
                {"job_id": 1, "user_name": "a", "partition": "gpu", "job_state": ["RUNNING"]},
                {"job_id": 2, "user_name": "b", "partition": null, "job_state": ["PENDING"]},
                {"job_id": "3", "user_name": "c"}
            ]}}"#,
        )
        .unwrap();

        let snapshot = Snapshot::from_payload(payload, 0);
        let ids = snapshot.jobs.iter().map(|j| j.job_id).collect::<Vec<_>>();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(
            snapshot.summary.top_users(Some(UNKNOWN_PARTITION)),
            &[UserCount {
                user: "b".into(),
                count: 1
            }]
        );
        assert_eq!(snapshot.summary.pending_count, 1);
    }

    #[test]
    fn test_from_payload() {
        let payload: Payload = serde_json::from_str(
            r#"{"status": "ok", "squeue": {"last_update": {"number": 200}, "jobs": [
                {"job_id": 1, "job_state": ["PENDING"], "submit_time": {"number": 150}}
            ]}}"#,
        )
        .unwrap();

        let snapshot = Snapshot::from_payload(payload.clone(), 1000);
        assert_eq!(snapshot.timestamp, 200);
        assert_eq!(snapshot.jobs[0].time_used_sec, 50);
        assert!(snapshot.partitions.is_empty());

        let mut payload = payload;
        payload.squeue.last_update = None;
        let snapshot = Snapshot::from_payload(payload, 1000);
        assert_eq!(snapshot.timestamp, 1000);
        assert_eq!(snapshot.jobs[0].time_used_sec, 850);
    }
}
