//! Home view session: action selection, draft editing and call creation.
//!
//! State lives behind a mutex that is never held across a remote call, so
//! the user can keep interacting while a creation is outstanding. Results
//! that arrive after the user closed or switched the panel are dropped.

use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::action::{ActionSelector, ActionState};
use super::creator::{CallCreator, CreatedCall, CreationError};
use super::draft::{DraftField, MeetingDraft};
use super::link::{derive_link, parse_join_link};
use super::signals::{Navigator, Notice, Notifier, Route};
use crate::calls::{CallHandle, CallId};
use crate::clipboard::TextClipboard;
use crate::identity::IdentityContext;

/// Which panel the presentation layer should show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "panel", rename_all = "snake_case")]
pub enum Panel {
    None,
    InstantPrompt,
    JoinPrompt,
    ScheduleForm,
    ScheduleCreated { link: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct HomeSnapshot {
    pub action: ActionState,
    pub panel: Panel,
    pub draft: MeetingDraft,
    pub call: Option<CallHandle>,
    pub link: Option<String>,
    pub submitting: bool,
}

#[derive(Debug, Default)]
struct HomeState {
    action: ActionSelector,
    draft: MeetingDraft,
    call: Option<CallHandle>,
    join_link_succeeded: bool,
    generation: u64,
}

impl HomeState {
    fn abandon(&mut self) {
        self.generation += 1;
        self.call = None;
    }

    fn reset_draft(&mut self) {
        let join_link = if self.join_link_succeeded {
            std::mem::take(&mut self.draft.join_link)
        } else {
            String::new()
        };
        self.draft = MeetingDraft::new();
        self.draft.join_link = join_link;
    }

    fn link(&self, base_url: &str) -> Option<String> {
        self.call.as_ref().map(|call| derive_link(base_url, &call.id))
    }

    fn panel(&self, base_url: &str) -> Panel {
        match self.action.current() {
            ActionState::None => Panel::None,
            ActionState::Instant => Panel::InstantPrompt,
            ActionState::Join => Panel::JoinPrompt,
            ActionState::Schedule => match self.link(base_url) {
                Some(link) => Panel::ScheduleCreated { link },
                None => Panel::ScheduleForm,
            },
        }
    }
}

pub struct HomeSession {
    state: Mutex<HomeState>,
    creator: CallCreator,
    identity: Arc<dyn IdentityContext>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    base_url: String,
}

impl HomeSession {
    pub fn new(
        creator: CallCreator,
        identity: Arc<dyn IdentityContext>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            state: Mutex::new(HomeState::default()),
            creator,
            identity,
            navigator,
            notifier,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn snapshot(&self) -> HomeSnapshot {
        let state = self.state.lock().await;
        HomeSnapshot {
            action: state.action.current(),
            panel: state.panel(&self.base_url),
            draft: state.draft.clone(),
            call: state.call.clone(),
            link: state.link(&self.base_url),
            submitting: self.creator.is_submitting(),
        }
    }

    pub async fn action(&self) -> ActionState {
        self.state.lock().await.action.current()
    }

    /// Switching to a different action abandons any call shown by the old one.
    pub async fn select(&self, action: ActionState) {
        let mut state = self.state.lock().await;
        if state.action.current() != action {
            state.abandon();
        }
        state.action.select(action);
        debug!("Action selected: {}", action.as_str());
    }

    /// Closes the active panel and discards the draft.
    ///
    /// The join link survives only when it was used to join successfully.
    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        state.action.clear();
        state.abandon();
        state.reset_draft();
    }

    pub async fn update_draft(&self, field: DraftField) {
        let mut state = self.state.lock().await;
        if matches!(field, DraftField::JoinLink(_)) {
            state.join_link_succeeded = false;
        }
        state.draft.update(field);
    }

    pub fn view_recordings(&self) {
        self.navigator.navigate(Route::Recordings);
    }

    /// Submits the draft from the instant or schedule panel.
    ///
    /// `Ok(None)` means nothing happened: no creating panel is open, the
    /// identity is not ready, a submission is in flight, or the user left
    /// the panel before the service answered.
    pub async fn submit(&self) -> Result<Option<CreatedCall>, CreationError> {
        let (mut draft, generation, action) = {
            let state = self.state.lock().await;
            (state.draft.clone(), state.generation, state.action.current())
        };

        if !action.creates_call() {
            debug!("Submit ignored: {} panel does not create calls", action.as_str());
            return Ok(None);
        }
        if action == ActionState::Instant {
            draft.description.clear();
        }

        let identity = self.identity.current();
        let Some(created) = self.creator.create_call(&draft, &identity).await? else {
            return Ok(None);
        };

        {
            let mut state = self.state.lock().await;
            if state.generation != generation {
                info!(
                    "Call {} created after panel was closed; ignoring",
                    created.handle.id
                );
                return Ok(None);
            }
            state.call = Some(created.handle.clone());
            state.reset_draft();
        }

        self.notifier.notify(Notice::MeetingCreated);

        if let Some(route) = &created.navigation {
            self.navigator.navigate(route.clone());
        }

        Ok(Some(created))
    }

    /// Follows the link typed into the join panel.
    pub async fn join(&self) -> Option<CallId> {
        let mut state = self.state.lock().await;
        if state.action.current() != ActionState::Join {
            debug!("Join ignored: join panel is not open");
            return None;
        }

        let input = state.draft.join_link.clone();
        match parse_join_link(&input) {
            Some(id) => {
                state.join_link_succeeded = true;
                drop(state);
                info!("Joining call {} from link", id);
                self.navigator.navigate(Route::Meeting(id.clone()));
                Some(id)
            }
            None => {
                drop(state);
                self.notifier.notify(Notice::InvalidJoinLink(input));
                None
            }
        }
    }

    pub async fn link(&self) -> Option<String> {
        self.state.lock().await.link(&self.base_url)
    }

    /// Copies the current meeting link; `Ok(None)` when no call exists yet.
    pub async fn copy_link(&self, clipboard: &mut dyn TextClipboard) -> Result<Option<String>> {
        let Some(link) = self.link().await else {
            return Ok(None);
        };

        clipboard.set_text(&link)?;
        self.link_copied();
        Ok(Some(link))
    }

    /// Acknowledges a copy performed outside [`HomeSession::copy_link`].
    pub fn link_copied(&self) {
        self.notifier.notify(Notice::LinkCopied);
    }
}
