//! Scheduling façade for Tryst.
//!
//! Composes the pure slot machinery from [`tryst_core`] with a booking
//! store, a contact store, and a confirmation-delivery sink into the three
//! operations callers actually use: list available slots, render a slot for
//! a viewer, and book. Transport, auth, and the actual email send are the
//! caller's responsibility.

mod scheduler;

pub use scheduler::{BookRequest, OrganizerConfig, Scheduler};

#[cfg(test)]
mod tests;
