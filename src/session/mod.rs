//! Session Drafting
//!
//! Information Hiding:
//! - Draft mutation rules (append order, snapshot commits) internalized
//! - Fresh-id generation hidden behind the controller
//! - Async action lifecycle tracked as an explicit state, not an ad hoc flag

pub mod controller;
pub mod task;

pub use controller::SessionController;
pub use task::{TaskOutcome, TaskState};
