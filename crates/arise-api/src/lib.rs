//! Document store adapter, session registry, and HTTP boundary for the habit tracker.

mod server;
mod sessions;
mod store;

pub use server::{serve, ServerError};
pub use sessions::{SessionUser, Sessions};
pub use store::{DocumentBackend, Documents, MemoryBackend, SqliteBackend, StoreError};
