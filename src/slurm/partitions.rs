use std::fmt;

use super::snapshot::RawPartitionGroup;

/// Node states reported by `sinfo`, ranked by how much attention they deserve
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeTag {
    Down,
    Fail,
    Failing,
    NotResponding,
    Drained,
    Draining,
    Drain,
    Mixed,
    Allocated,
    Completing,
    Idle,
    Reserved,
    Planned,
    Maintenance,
    PowerSave,
    Future,
    Unknown,
    /// Tags not known to the dashboard
    Other(String),
}

/// Coarse classification of node states used for coloring
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateClass {
    /// Nodes that cannot run jobs
    Error,
    /// Nodes running jobs
    Busy,
    /// Nodes ready to accept jobs
    Available,
    Neutral,
}

impl NodeTag {
    pub fn parse(tag: &str) -> Self {
        match tag.trim().trim_end_matches('*').to_ascii_uppercase().as_str() {
            "DOWN" => NodeTag::Down,
            "FAIL" => NodeTag::Fail,
            "FAILING" => NodeTag::Failing,
            "NOT_RESPONDING" => NodeTag::NotResponding,
            "DRAINED" => NodeTag::Drained,
            "DRAINING" => NodeTag::Draining,
            "DRAIN" => NodeTag::Drain,
            "MIXED" => NodeTag::Mixed,
            "ALLOCATED" | "ALLOC" => NodeTag::Allocated,
            "COMPLETING" => NodeTag::Completing,
            "IDLE" => NodeTag::Idle,
            "RESERVED" => NodeTag::Reserved,
            "PLANNED" => NodeTag::Planned,
            "MAINTENANCE" | "MAINT" => NodeTag::Maintenance,
            "POWERED_DOWN" | "POWERING_DOWN" | "POWERING_UP" | "POWER_DOWN" | "POWER_UP"
            | "POWER_DRAIN" | "CLOUD" => NodeTag::PowerSave,
            "FUTURE" => NodeTag::Future,
            "UNKNOWN" => NodeTag::Unknown,
            _ => NodeTag::Other(tag.to_string()),
        }
    }

    /// Higher values take precedence when picking the state shown for a group
    pub fn rank(&self) -> u8 {
        match self {
            NodeTag::Down => 16,
            NodeTag::Fail => 15,
            NodeTag::Failing => 14,
            NodeTag::NotResponding => 13,
            NodeTag::Drained => 12,
            NodeTag::Draining => 11,
            NodeTag::Drain => 10,
            NodeTag::Mixed => 9,
            NodeTag::Allocated => 8,
            NodeTag::Completing => 7,
            NodeTag::Idle => 6,
            NodeTag::Reserved => 5,
            NodeTag::Planned => 4,
            NodeTag::Maintenance => 3,
            NodeTag::PowerSave => 2,
            NodeTag::Future => 1,
            NodeTag::Unknown | NodeTag::Other(_) => 0,
        }
    }

    pub fn class(&self) -> StateClass {
        match self {
            NodeTag::Down
            | NodeTag::Fail
            | NodeTag::Failing
            | NodeTag::NotResponding
            | NodeTag::Drained
            | NodeTag::Draining
            | NodeTag::Drain => StateClass::Error,
            NodeTag::Mixed | NodeTag::Allocated | NodeTag::Completing => StateClass::Busy,
            NodeTag::Idle => StateClass::Available,
            _ => StateClass::Neutral,
        }
    }
}

impl fmt::Display for NodeTag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            NodeTag::Down => "DOWN",
            NodeTag::Fail => "FAIL",
            NodeTag::Failing => "FAILING",
            NodeTag::NotResponding => "NOT_RESPONDING",
            NodeTag::Drained => "DRAINED",
            NodeTag::Draining => "DRAINING",
            NodeTag::Drain => "DRAIN",
            NodeTag::Mixed => "MIXED",
            NodeTag::Allocated => "ALLOCATED",
            NodeTag::Completing => "COMPLETING",
            NodeTag::Idle => "IDLE",
            NodeTag::Reserved => "RESERVED",
            NodeTag::Planned => "PLANNED",
            NodeTag::Maintenance => "MAINTENANCE",
            NodeTag::PowerSave => "POWER_SAVE",
            NodeTag::Future => "FUTURE",
            NodeTag::Unknown => "UNKNOWN",
            NodeTag::Other(tag) => tag.as_str(),
        };

        fmt::Display::fmt(label, f)
    }
}

/// Nodes of a partition sharing the same set of states
#[derive(Clone, Debug, PartialEq)]
pub struct PartitionGroup {
    pub name: String,
    pub states: Vec<String>,
    pub nodes: u64,
}

impl PartitionGroup {
    /// Returns the highest ranked state tag; ties are resolved in favor of the first tag
    pub fn primary_state(&self) -> NodeTag {
        let mut primary: Option<NodeTag> = None;
        for tag in self.states.iter().map(|v| NodeTag::parse(v)) {
            if primary.as_ref().is_none_or(|p| tag.rank() > p.rank()) {
                primary = Some(tag);
            }
        }

        primary.unwrap_or(NodeTag::Unknown)
    }

    /// Returns all state tags joined by '+', similar to `sinfo` output
    pub fn state_label(&self) -> String {
        if self.states.is_empty() {
            NodeTag::Unknown.to_string()
        } else {
            self.states.join("+")
        }
    }
}

impl From<RawPartitionGroup> for PartitionGroup {
    fn from(raw: RawPartitionGroup) -> Self {
        Self {
            name: raw.partition.name,
            states: raw.node.state,
            nodes: raw.nodes.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(states: &[&str]) -> PartitionGroup {
        PartitionGroup {
            name: "cpu".into(),
            states: states.iter().map(|v| v.to_string()).collect(),
            nodes: 1,
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!(NodeTag::parse("IDLE"), NodeTag::Idle);
        assert_eq!(NodeTag::parse("idle"), NodeTag::Idle);
        assert_eq!(NodeTag::parse("DOWN*"), NodeTag::Down);
        assert_eq!(NodeTag::parse("POWERED_DOWN"), NodeTag::PowerSave);
        assert_eq!(NodeTag::parse("BLOCKED"), NodeTag::Other("BLOCKED".into()));
    }

    #[test]
    fn test_rank_is_total_over_known_tags() {
        let tags = [
            NodeTag::Down,
            NodeTag::Fail,
            NodeTag::Failing,
            NodeTag::NotResponding,
            NodeTag::Drained,
            NodeTag::Draining,
            NodeTag::Drain,
            NodeTag::Mixed,
            NodeTag::Allocated,
            NodeTag::Completing,
            NodeTag::Idle,
            NodeTag::Reserved,
            NodeTag::Planned,
            NodeTag::Maintenance,
            NodeTag::PowerSave,
            NodeTag::Future,
            NodeTag::Unknown,
        ];

        for pair in tags.windows(2) {
            assert!(pair[0].rank() > pair[1].rank(), "{:?}", pair);
        }
    }

    #[test]
    fn test_classes() {
        assert_eq!(NodeTag::Drain.class(), StateClass::Error);
        assert_eq!(NodeTag::Down.class(), StateClass::Error);
        assert_eq!(NodeTag::Mixed.class(), StateClass::Busy);
        assert_eq!(NodeTag::Allocated.class(), StateClass::Busy);
        assert_eq!(NodeTag::Idle.class(), StateClass::Available);
        assert_eq!(NodeTag::Other("X".into()).class(), StateClass::Neutral);
    }

    #[test]
    fn test_primary_state() {
        assert_eq!(group(&[]).primary_state(), NodeTag::Unknown);
        assert_eq!(group(&["IDLE"]).primary_state(), NodeTag::Idle);
        assert_eq!(group(&["MIXED", "DRAIN"]).primary_state(), NodeTag::Drain);
        assert_eq!(group(&["IDLE", "MIXED"]).primary_state(), NodeTag::Mixed);
        assert_eq!(
            group(&["ALLOCATED", "NOT_RESPONDING"]).primary_state(),
            NodeTag::NotResponding
        );
        assert_eq!(
            group(&["FOO", "BAR"]).primary_state(),
            NodeTag::Other("FOO".into())
        );
        assert_eq!(group(&["FOO", "IDLE"]).primary_state(), NodeTag::Idle);
    }

    #[test]
    fn test_state_label() {
        assert_eq!(group(&[]).state_label(), "UNKNOWN");
        assert_eq!(group(&["MIXED", "DRAIN"]).state_label(), "MIXED+DRAIN");
    }

    #[test]
    fn test_from_raw() {
        let raw: RawPartitionGroup = serde_json::from_str(
            r#"{"partition": {"name": "gpu"}, "node": {"state": ["IDLE"]}, "nodes": {"total": 3}}"#,
        )
        .unwrap();

        assert_eq!(
            PartitionGroup::from(raw),
            PartitionGroup {
                name: "gpu".into(),
                states: vec!["IDLE".into()],
                nodes: 3,
            }
        );
    }
}
