//! TUI widgets for the memory browser

pub mod fact_list;
pub mod input;
pub mod status_bar;
pub mod transcript;

pub use fact_list::FactListWidget;
pub use input::InputWidget;
pub use status_bar::{HotkeyBarWidget, StatusBarWidget};
pub use transcript::TranscriptWidget;
