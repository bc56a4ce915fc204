//! Thread-safe state storage.
//!
//! Two interchangeable lock strategies guard a state slot:
//!
//! - [`CoarseLock`]: one reentrant mutex around every read and write
//! - [`ReadWriteLock`]: shared reads, exclusive transitions
//!
//! Each instance owns its lock. Locks are never shared across instances,
//! so there is no lock ordering between them.

mod cell;
mod lock;

pub use cell::{RwStateCell, StateCell};
pub use lock::{CoarseLock, ExclusiveGuard, ReadWriteLock, StateLock};
