//! Home view session.
//!
//! Tracks the active action, the meeting draft, and the call created from
//! it, and derives the shareable link for that call.

pub mod action;
pub mod creator;
pub mod draft;
pub mod home;
pub mod link;
pub mod signals;

pub use action::{ActionSelector, ActionState};
pub use creator::{CallCreator, CreatedCall, CreationError};
pub use draft::{DraftField, MeetingDraft};
pub use home::{HomeSession, HomeSnapshot, Panel};
pub use link::{derive_link, parse_join_link};
pub use signals::{LogNotifier, Navigator, Notice, Notifier, Route};
