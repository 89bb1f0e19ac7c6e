use std::path::PathBuf;

use clap::{Parser, Subcommand};
use flowtask::Status;

#[derive(Parser)]
#[command(name = "flowtask", about = "Personal task tracker", version)]
pub struct Cli {
    /// Directory holding users.csv, tasks.csv and flowtask.log
    #[arg(long, env = "FLOWTASK_DATA_DIR", default_value = ".", global = true)]
    pub data_dir: PathBuf,

    /// Without a subcommand the interactive board starts
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print status counts and per-assignee totals
    Report {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List tasks
    List {
        /// Only tasks with this status (Pending, Progress, Done)
        #[arg(short, long)]
        status: Option<Status>,
        /// Only tasks assigned to this user
        #[arg(short, long)]
        assignee: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
