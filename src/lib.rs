//! Veggie Farm library crate: the save-state core and the plugins that wire
//! it into a Bevy app.
//!
//! The binary crate (`main.rs`) runs the core headless. The UI lives
//! elsewhere and drives everything through the events these plugins
//! register, which is also how `tests/` exercise it without a window.

pub mod shared;
pub mod data;
pub mod canning;
pub mod save;
