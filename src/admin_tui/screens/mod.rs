//! Screen modules for the admin TUI

pub mod entity_form;
pub mod entity_list;
pub mod main_menu;

pub use entity_form::{EntityFormScreen, FormLayout};
pub use entity_list::EntityListScreen;
pub use main_menu::MainMenuScreen;
