pub mod args;
pub mod meeting;
pub mod terminal;

pub use args::{Cli, CliCommand, JoinCliArgs, LinkCliArgs, ScheduleCliArgs};
pub use meeting::{
    handle_join_command, handle_link_command, handle_new_command, handle_schedule_command,
};
