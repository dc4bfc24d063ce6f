//! Built-in command modules.
//!
//! Add new modules by:
//! 1. Creating a new file in this directory
//! 2. Adding `pub mod your_module;` below
//! 3. Adding its factory to `all()`

pub mod chat;
pub mod menu;
pub mod ping;
pub mod poll;
pub mod reload;

use crate::modules::ModuleFactory;

/// Registration list for the command-module source.
pub fn all() -> Vec<ModuleFactory> {
    vec![
        Box::new(ping::module),
        Box::new(menu::module),
        Box::new(reload::module),
        Box::new(chat::module),
        Box::new(poll::module),
    ]
}
