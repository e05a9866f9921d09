use crate::export::ExportFormat;
use crate::models::{ProcessedStatus, PunchType};
use clap::{Parser, Subcommand};

/// Command-line interface definition for punchsync
/// Maintenance CLI over the local attendance store
#[derive(Parser)]
#[command(
    name = "punchsync",
    version = env!("CARGO_PKG_VERSION"),
    about = "Punch-clock attendance store and payroll sync agent: inspect and repair the local store",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Use a settings file other than the standard one
    #[arg(global = true, long = "config")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the settings file and the database
    Init,

    /// Show or update the synchronization configuration row
    Config {
        #[arg(long = "print", help = "Print the configuration (secrets masked)")]
        print_config: bool,

        #[arg(
            long = "set",
            value_name = "KEY=VALUE",
            help = "Set a configuration field, e.g. --set upload_interval=5"
        )]
        set: Vec<String>,
    },

    /// List attendance records
    Records {
        #[arg(long, help = "Filter by status: UNPROCESSED, PROCESSED or ERROR")]
        status: Option<ProcessedStatus>,

        #[arg(long = "errors", help = "Show the remote validation errors of each record")]
        errors: bool,
    },

    /// Insert a punch by hand (ignored if the timestamp is already stored)
    Add {
        #[arg(long = "user", help = "Device user id")]
        user: i64,

        #[arg(long = "name", default_value = "")]
        name: String,

        #[arg(long = "time", help = "Punch time, e.g. 2025-03-01 08:00:00")]
        time: String,

        #[arg(long = "type", help = "in or out")]
        punch_type: PunchType,

        #[arg(long = "device-status", default_value_t = 1)]
        device_status: i64,
    },

    /// Correct an existing record
    Edit {
        id: i64,

        #[arg(long = "name")]
        name: Option<String>,

        #[arg(long = "time")]
        time: Option<String>,

        #[arg(long = "type")]
        punch_type: Option<PunchType>,

        #[arg(long, help = "UNPROCESSED or PROCESSED")]
        status: Option<ProcessedStatus>,
    },

    /// Reset records so they are picked up again (default: UNPROCESSED)
    Retry {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<i64>,

        #[arg(long, default_value = "UNPROCESSED")]
        status: ProcessedStatus,
    },

    /// Delete records by id
    Del {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<i64>,
    },

    /// Show the upload audit log
    Logs {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Write the pending batch to a file without uploading it
    Export {
        #[arg(long, value_enum)]
        format: Option<ExportFormat>,
    },

    /// Show the jobs the agent registers from the configuration
    Jobs,
}
