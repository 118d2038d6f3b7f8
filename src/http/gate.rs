//! Access gate: classifies every request path as public or private before any handler runs.

use crate::domain::Caller;
use crate::ports::identity::IdentityResolver;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use std::sync::Arc;

const HOME: &str = "/home";
const PUBLIC_PAGES: &[&str] = &["/", HOME, "/sign-in", "/sign-up"];
const PUBLIC_API: &[&str] = &["/api/videos", "/api/upload-limits", "/health"];
const STATIC_EXTENSIONS: &[&str] = &[
    "html", "htm", "css", "js", "jpg", "jpeg", "webp", "png", "gif", "svg", "ttf", "woff",
    "woff2", "ico", "csv", "doc", "docx", "xls", "xlsx", "zip", "webmanifest",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    PublicPage,
    PublicApi,
    PrivatePage,
    PrivateApi,
    StaticAsset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Pass,
    Redirect(String),
    Reject,
}

pub fn classify(path: &str) -> RouteClass {
    let path = match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    };

    let is_static = path
        .rsplit('/')
        .next()
        .and_then(|segment| segment.rsplit_once('.'))
        .map(|(_, ext)| STATIC_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false);

    if path.starts_with("/_next/") || is_static {
        RouteClass::StaticAsset
    } else if PUBLIC_API.contains(&path) {
        RouteClass::PublicApi
    } else if PUBLIC_PAGES.contains(&path)
        || path.starts_with("/sign-in/")
        || path.starts_with("/sign-up/")
    {
        RouteClass::PublicPage
    } else if path == "/api" || path.starts_with("/api/") {
        RouteClass::PrivateApi
    } else {
        RouteClass::PrivatePage
    }
}

#[derive(Debug, Clone)]
pub struct AccessPolicy {
    sign_in_url: String,
}

impl AccessPolicy {
    pub fn new(sign_in_url: impl Into<String>) -> Self {
        Self {
            sign_in_url: sign_in_url.into(),
        }
    }

    pub fn decide(&self, path: &str, authenticated: bool) -> GateDecision {
        let class = classify(path);
        match (class, authenticated) {
            (RouteClass::StaticAsset, _) => GateDecision::Pass,
            (RouteClass::PublicPage, true) if path.trim_end_matches('/') != HOME => {
                GateDecision::Redirect(HOME.to_string())
            }
            (RouteClass::PrivatePage, false) => GateDecision::Redirect(self.sign_in_url.clone()),
            (RouteClass::PrivateApi, false) => GateDecision::Reject,
            _ => GateDecision::Pass,
        }
    }
}

#[derive(Clone)]
pub struct GateState {
    pub identity: Arc<dyn IdentityResolver>,
    pub policy: AccessPolicy,
}

pub async fn access_gate(State(gate): State<GateState>, mut request: Request, next: Next) -> Response {
    let caller = gate.identity.resolve(request.headers());
    let path = request.uri().path().to_string();
    let decision = gate.policy.decide(&path, caller.is_some());

    tracing::debug!(
        user = caller.as_ref().map(|c| c.user_id.as_str()).unwrap_or("-"),
        %path,
        ?decision,
        "access gate"
    );

    match decision {
        GateDecision::Pass => {
            if let Some(caller) = caller {
                request.extensions_mut().insert::<Caller>(caller);
            }
            next.run(request).await
        }
        GateDecision::Redirect(to) => Redirect::temporary(&to).into_response(),
        GateDecision::Reject => (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({
                "error": "You must be logged in to access this resource.",
                "code": "UNAUTHENTICATED",
            })),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> AccessPolicy {
        AccessPolicy::new("/sign-in")
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("/"), RouteClass::PublicPage);
        assert_eq!(classify("/home"), RouteClass::PublicPage);
        assert_eq!(classify("/sign-in/factor-one"), RouteClass::PublicPage);
        assert_eq!(classify("/api/videos"), RouteClass::PublicApi);
        assert_eq!(classify("/api/videos/"), RouteClass::PublicApi);
        assert_eq!(classify("/api/videos/download"), RouteClass::PrivateApi);
        assert_eq!(classify("/api/video-upload"), RouteClass::PrivateApi);
        assert_eq!(classify("/social-share"), RouteClass::PrivatePage);
        assert_eq!(classify("/favicon.ico"), RouteClass::StaticAsset);
        assert_eq!(classify("/_next/static/chunk"), RouteClass::StaticAsset);
    }

    #[test]
    fn test_json_is_not_a_static_asset() {
        assert_eq!(classify("/manifest.json"), RouteClass::PrivatePage);
    }

    #[test]
    fn test_signed_in_user_leaves_public_pages() {
        assert_eq!(policy().decide("/sign-in", true), GateDecision::Redirect("/home".to_string()));
        assert_eq!(policy().decide("/", true), GateDecision::Redirect("/home".to_string()));
        assert_eq!(policy().decide("/home", true), GateDecision::Pass);
    }

    #[test]
    fn test_anonymous_user_is_sent_to_sign_in() {
        assert_eq!(policy().decide("/video-upload", false), GateDecision::Redirect("/sign-in".to_string()));
        assert_eq!(policy().decide("/api/image-upload", false), GateDecision::Reject);
        assert_eq!(policy().decide("/api/videos", false), GateDecision::Pass);
        assert_eq!(policy().decide("/sign-up", false), GateDecision::Pass);
    }

    #[test]
    fn test_signed_in_user_reaches_private_routes() {
        assert_eq!(policy().decide("/api/video-upload", true), GateDecision::Pass);
        assert_eq!(policy().decide("/videos", true), GateDecision::Pass);
    }
}
