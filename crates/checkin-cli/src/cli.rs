use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "checkin")]
#[command(about = "Check attendees in and keep the event roster in sync")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Event to work on (defaults to CHECKIN_EVENT_ID)
    #[arg(long, global = true, value_name = "ID")]
    pub event: Option<String>,

    /// Optional path to local cache database
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download the full roster for the event
    Load,
    /// Check in the attendee encoded in a scanned ticket
    Scan {
        /// Decoded QR payload, e.g. '{"Event_Participant_ID": 1042}'
        payload: String,
    },
    /// Check in an attendee by participant ID
    CheckIn {
        /// Participant ID
        id: i64,
    },
    /// Upload queued check-ins
    Push,
    /// Fetch roster changes since the last sync
    Pull,
    /// Search the cached roster
    Search {
        /// Name, participant ID, email or phone (lists everyone when omitted)
        query: Option<String>,
        /// Number of attendees to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show check-in counters and sync state
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run a scanning session, reading ticket payloads from stdin
    Run,
    /// Remove the cached roster and queued check-ins for the event
    ClearCache,
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}
