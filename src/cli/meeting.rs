//! CLI handlers for meeting commands.
//!
//! Commands run the session core in-process against the configured
//! calling service, the same way the HTTP service does.

use anyhow::{anyhow, bail, Context, Result};
use std::sync::Arc;
use tokio::sync::mpsc;

use super::args::{JoinCliArgs, LinkCliArgs, ScheduleCliArgs};
use super::terminal::{resolving_spinner, PromptDeviceSetup, TerminalRoom};
use crate::app::Services;
use crate::calls::CallId;
use crate::clipboard::SystemClipboard;
use crate::config::Config;
use crate::join::JoinFlowHandle;
use crate::session::{derive_link, ActionState, DraftField, LogNotifier, Route};

const NOT_SIGNED_IN: &str =
    "No signed-in user. Set identity.user_id in the flexmeet config file.";

pub async fn handle_new_command() -> Result<()> {
    let services = Services::from_config(Config::load()?)?;
    let (nav_tx, mut nav_rx) = mpsc::unbounded_channel();
    let home = services.home_session(Arc::new(nav_tx), Arc::new(LogNotifier));

    home.select(ActionState::Instant).await;
    let created = home
        .submit()
        .await?
        .ok_or_else(|| anyhow!(NOT_SIGNED_IN))?;

    println!("Meeting created: {}", created.handle.id);

    match nav_rx.try_recv() {
        Ok(Route::Meeting(id)) => enter_meeting(&services, id).await,
        _ => Ok(()),
    }
}

pub async fn handle_schedule_command(args: ScheduleCliArgs) -> Result<()> {
    if args.description.trim().is_empty() {
        bail!("A scheduled meeting needs a description; use `flexmeet new` for an instant meeting");
    }

    let services = Services::from_config(Config::load()?)?;
    let (nav_tx, _nav_rx) = mpsc::unbounded_channel();
    let home = services.home_session(Arc::new(nav_tx), Arc::new(LogNotifier));

    home.select(ActionState::Schedule).await;
    if let Some(at) = args.at {
        home.update_draft(DraftField::StartTime(Some(at))).await;
    }
    home.update_draft(DraftField::Description(args.description))
        .await;

    let created = home
        .submit()
        .await?
        .ok_or_else(|| anyhow!(NOT_SIGNED_IN))?;

    let link = home
        .link()
        .await
        .context("Meeting created but no link available")?;

    println!("Meeting scheduled: {}", created.handle.description);
    if let Some(starts_at) = created.handle.starts_at {
        println!("Starts: {}", starts_at.to_rfc3339());
    }
    println!("Link: {}", link);

    if args.copy {
        println!("Copying link; waiting for the clipboard to take it over...");
        let mut clipboard = SystemClipboard::for_short_lived_process();
        home.copy_link(&mut clipboard).await?;
        println!("Link copied to clipboard.");
    }

    Ok(())
}

pub async fn handle_join_command(args: JoinCliArgs) -> Result<()> {
    let services = Services::from_config(Config::load()?)?;
    let (nav_tx, _nav_rx) = mpsc::unbounded_channel();
    let home = services.home_session(Arc::new(nav_tx), Arc::new(LogNotifier));

    home.select(ActionState::Join).await;
    home.update_draft(DraftField::JoinLink(args.link.clone()))
        .await;

    let Some(id) = home.join().await else {
        bail!("Invalid meeting link: {}", args.link);
    };

    enter_meeting(&services, id).await
}

pub fn handle_link_command(args: LinkCliArgs) -> Result<()> {
    let id = CallId::parse(&args.id)?;
    let config = Config::load()?;
    println!("{}", derive_link(&config.service.base_url, &id));
    Ok(())
}

async fn enter_meeting(services: &Services, id: CallId) -> Result<()> {
    let controller = services.join_controller();
    let flow = JoinFlowHandle::new(id.clone());

    let spinner = resolving_spinner(&id);
    let resolved = controller.resolve(&flow).await;
    spinner.finish_and_clear();
    resolved?;

    let room = TerminalRoom::new(services.config.service.base_url.clone());
    if !controller.enter(&flow, &PromptDeviceSetup, &room).await? {
        println!("Not joining meeting {}.", id);
    }

    Ok(())
}
