//! Application layer - Services built on the ports.

pub mod library;
pub mod upload;
