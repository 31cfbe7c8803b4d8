//! Commsage - communications-domain assistant chat client
//!
//! The session controller drafts the current conversation, the conversation
//! store keeps a durable, capacity-bounded history behind a single storage
//! slot, and the marker-text formatter turns assistant replies into typed
//! display blocks. The CLI front end is thin glue over the `ChatClient`
//! facade.

pub mod api;
pub mod cli;
pub mod config;
pub mod conversation;
pub mod core;
pub mod format;
pub mod session;
pub mod store;
pub mod uploads;
pub mod utils;

pub use api::{ChatClient, DataSource, GraphOutcome, KnowledgeGraph, SendOutcome};
pub use config::Settings;
pub use conversation::{Conversation, Role, Turn};
pub use format::{format_blocks, Block};
