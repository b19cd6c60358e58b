//! Storage abstractions for the issue register.
//!
//! The core never talks to a database directly; it consumes the narrow
//! async traits defined here. The in-memory adapter is the deterministic
//! reference implementation used by tests; production deployments plug in
//! a transactional backend behind the same traits.

#![deny(unsafe_code)]

pub mod error;
pub mod memory;
pub mod model;
pub mod traits;

pub use error::{StorageError, StorageResult};
pub use memory::InMemoryRegisterStore;
pub use model::{AuditQuery, IssueFilter, IssueSort};
pub use traits::{ActorStore, AuditStore, Clock, FixedClock, IssueStore, RegisterStore, SystemClock};
