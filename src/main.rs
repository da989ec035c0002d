use anyhow::Result;
use clap::Parser;
use flexmeet::{
    app,
    cli::{
        handle_join_command, handle_link_command, handle_new_command, handle_schedule_command,
        Cli, CliCommand,
    },
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = if cli.verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Some(CliCommand::Version) => {
            println!("flexmeet {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Some(CliCommand::New) => handle_new_command().await,
        Some(CliCommand::Schedule(args)) => handle_schedule_command(args).await,
        Some(CliCommand::Join(args)) => handle_join_command(args).await,
        Some(CliCommand::Link(args)) => handle_link_command(args),
        Some(CliCommand::Serve) | None => app::run_service().await,
    }
}
