// src/institutional/mod.rs
//! Institutional custody integration: configuration types, the background
//! request channel and the custody action creators.

pub mod actions;
pub mod background;
pub mod types;

pub use actions::MmiActions;
pub use background::{BackgroundConnection, BackgroundError, Dispatchable, HttpBackgroundConnection};
pub use types::*;
