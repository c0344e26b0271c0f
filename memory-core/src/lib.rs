//! View state and request routing for the unified memory front-end.
//!
//! This crate provides:
//! - Per-page view state (dashboard, chat, import form, memory browser)
//! - Three-state `Remote<T>` results for data being fetched
//! - Request scopes that cancel a view's in-flight calls when it is left
//! - A `MemoryBackend` seam with an HTTP implementation and a mock
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use memory_api::{ClientConfig, MemoryClient, DEFAULT_BASE_URL};
//! use memory_core::{Page, Router, RouterConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = MemoryClient::new(ClientConfig::new(DEFAULT_BASE_URL))?;
//!     let mut router = Router::new(Arc::new(client), RouterConfig::default());
//!
//!     router.navigate(Page::Dashboard);
//!     router.settle().await;
//!
//!     if let Some(dashboard) = router.dashboard() {
//!         println!("{} facts", dashboard.total_facts_label());
//!     }
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod input;
pub mod remote;
pub mod router;
pub mod task;
pub mod testing;
pub mod views;

pub use backend::MemoryBackend;
pub use input::InputBuffer;
pub use remote::{Remote, RemoteSlot};
pub use router::{ActionError, Completion, Outcome, Page, Router, RouterConfig, View};
pub use task::{RequestScope, Ticket};
pub use testing::{MockBackend, MockCall};
pub use views::{
    ChatState, ChatView, Dashboard, ImportForm, ImportRejected, ImportStatus, MemoryBrowser,
    Message, Role, SubmitRejected,
};
