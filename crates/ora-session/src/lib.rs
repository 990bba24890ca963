//! ORA Session - TTL-expiring workflow state
//!
//! Tracks mutable session state and an append-only execution log for any
//! long-running operation in the pipeline. Expiry is lazy: checked on every
//! read and write, with an explicit [`SessionStore::cleanup_expired`] sweep
//! for housekeeping.
//!
//! # Example
//!
//! ```rust
//! use ora_session::{ExecutionRecord, SessionStore};
//! use std::time::Duration;
//!
//! let store = SessionStore::new(Duration::from_secs(1800));
//! let id = store.create_session("user-1", serde_json::json!({ "stage": "planning" }));
//!
//! store.append_execution(id, ExecutionRecord::success("planner", 250)).unwrap();
//! assert_eq!(store.get_session(id).unwrap().history.len(), 1);
//! ```

#![warn(unreachable_pub)]

pub mod store;

pub use store::{ExecutionRecord, SessionState, SessionStore};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
