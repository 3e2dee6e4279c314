//! Command-line interface orchestration for akami.
//!
//! Offers a `cluster` command that loads a numeric CSV matrix, runs the
//! agglomerative clustering pipeline, and renders a summary of the flat
//! clustering.

mod commands;

pub use commands::{
    AffinityArg, Cli, CliError, ClusterCommand, Command, ExecutionSummary, LinkageArg,
    render_summary, run_cli,
};
