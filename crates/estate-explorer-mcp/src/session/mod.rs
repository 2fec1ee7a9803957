//! Loaded artifacts plus the scoring policy requests run against.

pub mod manager;

pub use manager::EstateSession;
