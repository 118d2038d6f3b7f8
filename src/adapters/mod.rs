//! Adapters - Concrete implementations of ports.

pub mod cloudinary;
pub mod identity;
pub mod postgres;

#[cfg(test)]
pub(crate) mod memory;
