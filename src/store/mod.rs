//! Persistence seam — the engine's only asynchronous boundary.
//!
//! Durable storage is an external collaborator; the engine reads and writes
//! through the narrow [`SessionStore`] trait and ships only an in-memory
//! backend for in-process use and tests.

pub mod memory;
pub mod traits;

pub use memory::MemoryStore;
pub use traits::SessionStore;
