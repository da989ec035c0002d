//! System clipboard access for copying meeting links.
//!
//! On X11 and Wayland the copied text lives only as long as the owning
//! `Clipboard`, so the service keeps one open for its whole lifetime and
//! the CLI waits for another application to take the text over.

use anyhow::{anyhow, Result};
use arboard::Clipboard;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Destination for an explicit copy action.
pub trait TextClipboard {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// A clipboard shared by every request of a long-running service.
pub type SharedClipboard = Arc<Mutex<Box<dyn TextClipboard + Send>>>;

pub fn shared(clipboard: impl TextClipboard + Send + 'static) -> SharedClipboard {
    Arc::new(Mutex::new(Box::new(clipboard)))
}

/// The desktop clipboard, opened lazily on first copy and kept open.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<Clipboard>,
    wait_for_handoff: bool,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// For processes that exit right after copying. On Linux each copy
    /// blocks until a clipboard manager or another application owns the text.
    pub fn for_short_lived_process() -> Self {
        Self {
            inner: None,
            wait_for_handoff: true,
        }
    }
}

impl TextClipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        if self.inner.is_none() {
            let clipboard =
                Clipboard::new().map_err(|e| anyhow!("Failed to initialize clipboard: {}", e))?;
            self.inner = Some(clipboard);
        }

        let clipboard = self
            .inner
            .as_mut()
            .ok_or_else(|| anyhow!("Clipboard unavailable"))?;
        write_text(clipboard, text, self.wait_for_handoff)
            .map_err(|e| anyhow!("Failed to copy to clipboard: {}", e))?;

        debug!("Copied {} chars to clipboard", text.len());
        Ok(())
    }
}

#[cfg(target_os = "linux")]
fn write_text(clipboard: &mut Clipboard, text: &str, wait: bool) -> Result<(), arboard::Error> {
    use arboard::SetExtLinux;

    if wait {
        clipboard.set().wait().text(text)
    } else {
        clipboard.set_text(text)
    }
}

#[cfg(not(target_os = "linux"))]
fn write_text(clipboard: &mut Clipboard, text: &str, _wait: bool) -> Result<(), arboard::Error> {
    clipboard.set_text(text)
}
