//! blobsync-core: Core library for the blobsync backup utility
//!
//! This crate provides the synchronization engine for blobsync, including:
//! - Change detection and per-transfer attempt budgets (`TransferPolicy`)
//! - Bounded-parallelism job execution (`WorkScheduler`)
//! - The five operations: backup, restore, clean, list, delete (`SyncEngine`)
//! - The `ObjectStore` trait abstracting the remote container
//!
//! This crate is designed to be independent of any specific storage SDK,
//! allowing for easy testing and potential future support for other backends.

pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod item;
pub mod keepalive;
pub mod localfs;
pub mod mime;
pub mod options;
pub mod policy;
pub mod retry;
pub mod scheduler;
pub mod traits;

pub use config::AccountConfig;
pub use engine::{ProgressHook, SyncEngine};
pub use error::{Error, Result};
pub use filter::{ExtensionFilter, extension_of};
pub use item::{ContainerInfo, LocalItem, RemoteItem, RunSummary, TransferOutcome};
pub use keepalive::{DEFAULT_KEEPALIVE_INTERVAL, HostSignaler, KeepAwake};
pub use options::SyncOptions;
pub use policy::{AttemptBudget, TransferPolicy};
pub use retry::{RetryConfig, is_retryable_error, retry_with_backoff};
pub use scheduler::{SchedulerReport, WorkScheduler};
pub use traits::ObjectStore;
