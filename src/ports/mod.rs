//! Ports - Trait seams to the external collaborators.

pub mod identity;
pub mod ingestion;
pub mod repository;
