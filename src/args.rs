use argh::FromArgs;

/// Text-based dashboard for the job queue and partitions of a Slurm cluster
#[derive(FromArgs, Debug)]
pub struct Args {
    /// name of the cluster, as known by the dashboard backend
    #[argh(positional, default = "\"localhost\".to_string()")]
    pub host: String,

    /// base URL of the dashboard backend
    #[argh(option, default = "\"http://127.0.0.1:5001\".to_string()")]
    pub url: String,

    /// query Slurm on this machine via `sinfo`/`squeue` instead of the backend
    #[argh(switch)]
    pub local: bool,

    /// location of `sinfo` executable (with --local)
    #[argh(option, default = "\"sinfo\".to_string()")]
    pub sinfo: String,

    /// location of `squeue` executable (with --local)
    #[argh(option, default = "\"squeue\".to_string()")]
    pub squeue: String,

    /// refresh frequency in seconds; a value of zero disables automatic updates
    #[argh(option, default = "30")]
    pub interval: u64,

    /// number of users listed in the summary
    #[argh(option, default = "10")]
    pub top_users: usize,

    /// write log messages to this file; filtered via RUST_LOG
    #[argh(option)]
    pub log_file: Option<String>,

    /// print version information
    #[argh(switch, short = 'v')]
    pub version: bool,
}
