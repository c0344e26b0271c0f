//! Per-page view state.
//!
//! Views hold only local state and never perform I/O themselves. Anything
//! that needs the backend is handed to the router through a dispatch closure,
//! which returns the [`Ticket`](crate::task::Ticket) the view then waits on.

pub mod chat;
pub mod dashboard;
pub mod import;
pub mod memory;

pub use chat::{ChatState, ChatView, Message, Role, SubmitRejected, SUGGESTED_PROMPTS};
pub use dashboard::Dashboard;
pub use import::{read_upload, ImportForm, ImportRejected, ImportStatus};
pub use memory::{fact_matches, filter_facts, format_timestamp, Category, MemoryBrowser, CATEGORIES};
