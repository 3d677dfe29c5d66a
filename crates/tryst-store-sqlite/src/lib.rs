//! SQLite backend for the Tryst booking and contact stores.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! connection thread without blocking the async runtime. That single
//! thread is also what makes the check-and-insert conflict guard atomic:
//! no two writes to the booking set can interleave.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
