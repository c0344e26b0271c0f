//! UI module for the memory TUI

pub mod layout;
pub mod render;
pub mod theme;
pub mod widgets;

pub use render::render;
