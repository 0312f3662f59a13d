#![doc = "The `tasksync` library crate."]
#![doc = ""]
#![doc = "Client-side session manager and data-synchronization layer for a"]
#![doc = "task-management service: it authenticates a user, persists and"]
#![doc = "propagates the resulting bearer credential, and keeps a local cache"]
#![doc = "of task records consistent with the service through CRUD and"]
#![doc = "file-upload operations. View rendering, routing tables and styling"]
#![doc = "are the embedding application's business; this crate only exposes"]
#![doc = "the state they read and the navigation signals they react to."]

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod navigation;
pub mod session;
pub mod storage;
pub mod tasks;
pub mod transport;

pub use client::Client;
pub use config::Config;
pub use error::ApiError;
pub use navigation::{LogNavigator, Navigator, Route};
pub use session::SessionManager;
pub use storage::{CredentialStore, FileStore, MemoryStore};
pub use tasks::TaskStore;
