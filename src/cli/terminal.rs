//! Terminal stand-ins for the device-setup panel, the live room and the loader.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use dialoguer::{theme::ColorfulTheme, Confirm};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::calls::{CallHandle, CallId};
use crate::join::{DeviceSetup, RoomRenderer};
use crate::session::derive_link;

/// Asks the user to confirm camera and microphone before joining.
pub struct PromptDeviceSetup;

#[async_trait]
impl DeviceSetup for PromptDeviceSetup {
    async fn confirm(&self, call: Option<&CallHandle>) -> Result<bool> {
        let Some(call) = call else {
            println!("Meeting not found.");
            return Ok(false);
        };

        println!("Meeting: {}", call.description);
        if let Some(starts_at) = call.starts_at {
            println!("Starts:  {}", starts_at.to_rfc3339());
        }

        tokio::task::spawn_blocking(|| {
            Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt("Camera and microphone ready? Join now")
                .default(true)
                .interact()
                .map_err(|e| anyhow!("Device setup prompt failed: {}", e))
        })
        .await?
    }
}

/// Holds the room open until Ctrl+C; media is rendered by the calling service.
pub struct TerminalRoom {
    base_url: String,
}

impl TerminalRoom {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl RoomRenderer for TerminalRoom {
    async fn enter(&self, call: CallHandle) -> Result<()> {
        println!("In meeting {}", call.id);
        println!("Invite: {}", derive_link(&self.base_url, &call.id));
        println!("Press Ctrl+C to leave.");

        tokio::signal::ctrl_c().await?;
        println!("Left meeting {}", call.id);
        Ok(())
    }
}

/// Loader shown while a meeting route is resolving.
pub fn resolving_spinner(id: &CallId) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(format!("Loading meeting {}", id));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
