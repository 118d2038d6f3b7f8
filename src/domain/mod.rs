//! Domain layer - Media assets and video records, free of I/O.

pub mod media;
pub mod video;

/// Identity of an authenticated caller, as resolved from the identity provider's token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
}
