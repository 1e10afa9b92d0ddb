/// Application.
pub mod app;
/// Command-line arguments
pub mod args;
/// Snapshot and view state of a cluster
pub mod dashboard;
/// Terminal events handler
pub mod event;
/// Event handler.
pub mod handler;
/// Slurm job and partition data
pub mod slurm;
/// Terminal user interface
pub mod tui;
/// Widget renderer
pub mod ui;
/// Filtering and sorting of the job list
pub mod view;
/// Custom widgets
pub mod widgets;
