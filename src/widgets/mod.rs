mod jobs;
mod misc;
mod partitions;
mod table;
mod users;

pub use jobs::{JobTable, JobTableState};
pub use partitions::{PartitionTable, PartitionTableState};
pub use users::{UserTable, UserTableState};
