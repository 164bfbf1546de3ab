//! Inbox core library: file-backed conversation store, platform previews, message
//! ingestion, and the HTTP API used by the CLI.

pub mod aggregate;
pub mod catalog;
pub mod config;
pub mod contact;
pub mod error;
pub mod faq;
pub mod ingest;
pub mod init;
pub mod preview;
pub mod server;
pub mod store;
pub mod thread;

pub use error::{InboxError, InboxResult};
