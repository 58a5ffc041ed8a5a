//! Terminal dashboard for managing travels and drivers
//!
//! Screens never block on the network: work is spawned through
//! [`events::TaskRunner`] and results come back to the UI loop as
//! [`events::AppEvent`]s tagged with the ticket the screen was handed.

pub mod app;
pub mod components;
pub mod events;
pub mod handlers;
pub mod screens;
pub mod traits;
pub mod ui;

pub use app::{App, Screen};
pub use events::AppEvent;

pub use screens::{EntityFormScreen, EntityListScreen, MainMenuScreen};
