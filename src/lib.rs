//! travel-admin: terminal dashboard for travels and drivers

pub mod admin_tui;
pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod forms;
pub mod listing;
pub mod models;
pub mod navigation;
pub mod table;
