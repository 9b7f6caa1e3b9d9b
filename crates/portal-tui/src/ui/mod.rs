//! Terminal UI module using ratatui.
//!
//! This module provides the TUI rendering and input handling:
//!
//! - `render`: Frame layout and overlays
//! - `input`: Keyboard and mouse event handling
//! - `styles`: Color schemes and text styling
//! - `views`: Login and dashboard screens

pub mod input;
pub mod render;
pub mod styles;
pub mod views;
