//! Reusable UI components for the admin TUI

pub mod confirm_dialog;
pub mod data_table;
pub mod form_field;
pub mod status_display;

pub use confirm_dialog::ConfirmDialog;
pub use data_table::DataTable;
pub use form_field::{FieldKind, FormField};
pub use status_display::{StatusDisplay, StatusType};
