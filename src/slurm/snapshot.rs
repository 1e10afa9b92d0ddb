use std::fmt;

use serde::{de, Deserialize, Deserializer};
use tracing::warn;

/// Integer as emitted by `squeue --json`/`sinfo --json`. Recent Slurm releases
/// wrap numbers in `{"set": .., "infinite": .., "number": ..}`, while older
/// releases emit a bare integer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlurmNumber {
    pub set: bool,
    pub infinite: bool,
    pub number: i64,
}

impl SlurmNumber {
    pub fn new(number: i64) -> Self {
        Self {
            set: true,
            infinite: false,
            number,
        }
    }

    /// Returns the value, or None if unset or infinite
    pub fn value(&self) -> Option<i64> {
        if self.set && !self.infinite {
            Some(self.number)
        } else {
            None
        }
    }
}

impl<'de> Deserialize<'de> for SlurmNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Wrapped {
            #[serde(default = "default_set")]
            set: bool,
            #[serde(default)]
            infinite: bool,
            #[serde(default)]
            number: i64,
        }

        fn default_set() -> bool {
            true
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Bare(i64),
            Wrapped(Wrapped),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Bare(number) => SlurmNumber::new(number),
            Repr::Wrapped(v) => SlurmNumber {
                set: v.set,
                infinite: v.infinite,
                number: v.number,
            },
        })
    }
}

/// A job as listed by `squeue --json`; fields not used by the dashboard are ignored
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RawJob {
    pub job_id: u64,
    #[serde(deserialize_with = "null_as_empty")]
    pub user_name: String,
    /// State tags; the first tag is the primary state
    #[serde(deserialize_with = "one_or_many")]
    pub job_state: Vec<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub partition: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub name: String,
    /// Epoch seconds; only meaningful for running jobs
    pub start_time: Option<SlurmNumber>,
    /// Epoch seconds
    pub submit_time: Option<SlurmNumber>,
    /// Time limit in minutes; absent or non-positive means unlimited
    pub time_limit: Option<SlurmNumber>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RawPartitionName {
    #[serde(deserialize_with = "null_as_empty")]
    pub name: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RawNodeState {
    #[serde(deserialize_with = "one_or_many")]
    pub state: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RawNodeCount {
    pub total: u64,
}

/// One partition/node-state grouping as listed by `sinfo --json`
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RawPartitionGroup {
    pub partition: RawPartitionName,
    pub node: RawNodeState,
    pub nodes: RawNodeCount,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct SqueueReport {
    /// Time at which the controller produced the job list
    pub last_update: Option<SlurmNumber>,
    #[serde(deserialize_with = "skip_malformed")]
    pub jobs: Vec<RawJob>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct SinfoReport {
    #[serde(deserialize_with = "skip_malformed")]
    pub sinfo: Vec<RawPartitionGroup>,
}

/// Response of the dashboard backend for a single host
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Payload {
    pub status: String,
    pub message: Option<String>,
    pub host: Option<String>,
    pub squeue: SqueueReport,
    pub sinfo: SinfoReport,
}

impl Payload {
    /// Returns true if the backend reported an application-level failure
    pub fn is_error(&self) -> bool {
        self.status == "error"
    }
}

/// Treats `null` like a missing string
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decodes each list entry on its own, dropping entries that fail to decode
/// so that one bad record does not discard the rest of the list
fn skip_malformed<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: de::DeserializeOwned,
{
    let values = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?;

    Ok(values
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .filter_map(|(idx, value)| match serde_json::from_value(value) {
            Ok(entry) => Some(entry),
            Err(error) => {
                warn!(idx, %error, "skipping malformed entry");
                None
            }
        })
        .collect())
}

/// Accepts either a single string or a list of strings
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct OneOrMany;

    impl<'de> de::Visitor<'de> for OneOrMany {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a state tag or a list of state tags")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![v.to_string()])
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: de::SeqAccess<'de>,
        {
            let mut values = Vec::new();
            while let Some(value) = seq.next_element::<String>()? {
                values.push(value);
            }

            Ok(values)
        }
    }

    deserializer.deserialize_any(OneOrMany)
}
