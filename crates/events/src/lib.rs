#![warn(clippy::unwrap_used)]

pub mod store;

pub use store::EventStore;
