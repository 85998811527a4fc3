//! Terminal UI module using ratatui.
//!
//! This module provides the TUI rendering and input handling:
//!
//! - `render`: Main frame rendering, layout and overlays
//! - `input`: Keyboard event handling
//! - `styles`: Color schemes and text styling
//! - `report`: County report (summary card and detailed view)
//! - `tutorial`: First-run tutorial overlay

pub mod input;
pub mod render;
pub mod report;
pub mod styles;
pub mod tutorial;
