//! Meeting session controller.
//!
//! Creates, schedules and joins calls hosted by an external calling service,
//! and gates entry into the live room behind a device-setup confirmation.

pub mod api;
pub mod app;
pub mod calls;
pub mod cli;
pub mod clipboard;
pub mod config;
pub mod global;
pub mod identity;
pub mod join;
pub mod session;
