//! danmaku: scrolling comment overlay for the terminal.
//!
//! Comments arrive from a live-chat transport, are published on an event
//! bus, and are laid out by a two-lane placement engine that fills one lane
//! top to bottom while evicting the oldest comments of the other.
//!
//! The pure core (`bus`, `engine`, `projector`, `integration`) never touches
//! I/O; `source`, `view` and `logging` form the impure shell.

pub mod bus;
pub mod config;
pub mod engine;
pub mod integration;
pub mod logging;
pub mod model;
pub mod parser;
pub mod projector;
pub mod source;
pub mod view;
