use chrono::{DateTime, Utc};
use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "flexmeet")]
#[command(about = "Start, schedule and join video meetings", long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Run the HTTP session service (default)
    Serve,
    /// Start an instant meeting and join it
    New,
    /// Schedule a meeting for later and print its link
    Schedule(ScheduleCliArgs),
    /// Join a meeting by link or id
    Join(JoinCliArgs),
    /// Print the shareable link for a meeting id
    Link(LinkCliArgs),
    /// Print version information
    Version,
}

#[derive(ClapArgs, Debug)]
pub struct ScheduleCliArgs {
    /// Start time, RFC 3339 (e.g. 2025-01-01T10:00:00Z). Defaults to now
    #[arg(long, value_parser = parse_start_time)]
    pub at: Option<DateTime<Utc>>,
    /// Meeting description shown to participants
    #[arg(short, long)]
    pub description: String,
    /// Copy the meeting link to the clipboard
    #[arg(short, long)]
    pub copy: bool,
}

#[derive(ClapArgs, Debug)]
pub struct JoinCliArgs {
    /// Meeting link, /meeting/<id> path, or bare meeting id
    pub link: String,
}

#[derive(ClapArgs, Debug)]
pub struct LinkCliArgs {
    /// Meeting id
    pub id: String,
}

fn parse_start_time(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| format!("invalid RFC 3339 time '{}': {}", raw, e))
}
