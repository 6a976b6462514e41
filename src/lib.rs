//! Gesture-controlled side-scroller.
//!
//! The simulation core (`compute`, `avatar`, `obstacles`) is pure and
//! display-free; `gesture` and `display` adapt it to a terminal.

pub mod avatar;
pub mod clock;
pub mod compute;
pub mod config;
pub mod display;
pub mod entities;
pub mod error;
pub mod gesture;
pub mod obstacles;
