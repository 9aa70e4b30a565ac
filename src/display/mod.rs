// src/display/mod.rs
pub mod locale;
pub mod menu;
pub mod table;

pub use locale::Locale;
pub use menu::Menu;
pub use table::render_table;
