//! Built-in event modules.
//!
//! Add new event handlers by:
//! 1. Creating a new file in this directory
//! 2. Adding `pub mod your_event;` below
//! 3. Adding its factory to `all()`

pub mod observer;
pub mod welcome;

use crate::modules::ModuleFactory;

/// Registration list for the event-module source.
pub fn all() -> Vec<ModuleFactory> {
    vec![Box::new(welcome::module), Box::new(observer::module)]
}
