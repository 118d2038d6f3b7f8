use crate::domain::Caller;
use axum::http::HeaderMap;

/// Resolves the caller from request headers. `None` means anonymous.
#[cfg_attr(test, mockall::automock)]
pub trait IdentityResolver: Send + Sync {
    fn resolve(&self, headers: &HeaderMap) -> Option<Caller>;
}
