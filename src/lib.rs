//! Cloudshelf - Media upload and library service
//!
//! Hexagonal Architecture:
//! - domain/: Media assets, video records, callers
//! - ports/: Trait definitions (media ingestion, video store, identity)
//! - adapters/: Concrete implementations (Cloudinary, PostgreSQL, JWT)
//! - application/: Upload and library services
//! - http/: axum router, access gate and handlers
//! - config: Environment configuration

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod http;
pub mod ports;

pub use config::AppConfig;
