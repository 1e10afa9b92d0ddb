use std::collections::BTreeMap;

use indexmap::IndexMap;

use super::jobs::EnrichedJob;

/// Key used for jobs without a partition
pub const UNKNOWN_PARTITION: &str = "unknown";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserCount {
    pub user: String,
    pub count: usize,
}

/// Cluster-wide and per-partition job statistics
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClusterAggregates {
    pub running_count: usize,
    pub pending_count: usize,
    pub unique_user_count: usize,
    /// Jobs per user, by descending count; ties keep the order in which users were first seen
    pub top_users_overall: Vec<UserCount>,
    /// As `top_users_overall`, but restricted to the jobs of each partition
    pub top_users_by_partition: BTreeMap<String, Vec<UserCount>>,
}

impl ClusterAggregates {
    pub fn collect(jobs: &[EnrichedJob]) -> Self {
        let mut overall = IndexMap::<&str, usize>::new();
        let mut by_partition = IndexMap::<&str, IndexMap<&str, usize>>::new();
        let mut running_count = 0;
        let mut pending_count = 0;

        for job in jobs {
            if job.is_running() {
                running_count += 1;
            } else if job.is_pending() {
                pending_count += 1;
            }

            let partition = if job.partition.is_empty() {
                UNKNOWN_PARTITION
            } else {
                job.partition.as_str()
            };

            *overall.entry(job.user_name.as_str()).or_default() += 1;
            *by_partition
                .entry(partition)
                .or_default()
                .entry(job.user_name.as_str())
                .or_default() += 1;
        }

        Self {
            running_count,
            pending_count,
            unique_user_count: overall.len(),
            top_users_overall: ranked(overall),
            top_users_by_partition: by_partition
                .into_iter()
                .map(|(partition, users)| (partition.to_string(), ranked(users)))
                .collect(),
        }
    }

    /// Returns the top users for a partition, or for the whole cluster if `partition` is None
    pub fn top_users(&self, partition: Option<&str>) -> &[UserCount] {
        match partition {
            Some(partition) => self
                .top_users_by_partition
                .get(partition)
                .map(Vec::as_slice)
                .unwrap_or_default(),
            None => &self.top_users_overall,
        }
    }
}

/// Sorts counts in descending order; the sort is stable, so ties keep insertion order
fn ranked(counts: IndexMap<&str, usize>) -> Vec<UserCount> {
    let mut counts = counts
        .into_iter()
        .map(|(user, count)| UserCount {
            user: user.to_string(),
            count,
        })
        .collect::<Vec<_>>();

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}
