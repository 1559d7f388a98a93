pub mod db;
pub mod input;
pub mod keybinds;
pub mod logging;
pub mod picker;
pub mod popup;
pub mod ui;
