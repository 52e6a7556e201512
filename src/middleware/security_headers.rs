//! Security-related response headers for browser clients.
//!
//! This is the helmet-style header set, applied at the Router level.
//!
//! Responsibility:
//! - Clickjacking protection
//! - MIME sniffing protection
//! - Referrer leakage control
//! - Browser feature restrictions
//!
//! This is intentionally configuration-free for now.

use axum::Router;
use axum::http::header::{HeaderName, HeaderValue};
use tower_http::set_header::SetResponseHeaderLayer;

fn static_header(router: Router, name: &'static str, value: &'static str) -> Router {
    router.layer(SetResponseHeaderLayer::if_not_present(
        HeaderName::from_static(name),
        HeaderValue::from_static(value),
    ))
}

/// Apply common security headers to all responses.
pub fn apply(router: Router) -> Router {
    let router = static_header(router, "x-frame-options", "DENY");
    let router = static_header(router, "content-security-policy", "frame-ancestors 'none'");
    let router = static_header(router, "x-content-type-options", "nosniff");
    let router = static_header(router, "referrer-policy", "no-referrer");
    static_header(
        router,
        "permissions-policy",
        "camera=(), microphone=(), geolocation=()",
    )
}
