//! Trusted-host filtering.
//!
//! Requests whose `Host` does not match the configured allowlist are answered
//! with `400 Invalid host header` before reaching any handler.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::AllowList;

/// Host name with any port removed. IPv6 literals keep their brackets.
pub fn strip_port(authority: &str) -> &str {
    if authority.starts_with('[') {
        return match authority.find(']') {
            Some(end) => &authority[..=end],
            None => authority,
        };
    }
    authority.split(':').next().unwrap_or(authority)
}

/// Whether `host` matches an entry; `*.domain` matches any subdomain.
pub fn host_allowed(hosts: &AllowList, host: &str) -> bool {
    match hosts {
        AllowList::Any => true,
        AllowList::Only(patterns) => patterns.iter().any(|pattern| {
            match pattern.strip_prefix('*') {
                Some(suffix) if suffix.starts_with('.') => host
                    .to_ascii_lowercase()
                    .ends_with(&suffix.to_ascii_lowercase()),
                _ => host.eq_ignore_ascii_case(pattern),
            }
        }),
    }
}

pub async fn enforce_trusted_host(
    State(hosts): State<AllowList>,
    request: Request,
    next: Next,
) -> Response {
    if hosts.is_any() {
        return next.run(request).await;
    }

    let authority = request
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| request.uri().authority().map(|a| a.to_string()))
        .unwrap_or_default();

    let host = strip_port(&authority);
    if host_allowed(&hosts, host) {
        next.run(request).await
    } else {
        log::warn!("rejected request for untrusted host {:?}", authority);
        (StatusCode::BAD_REQUEST, "Invalid host header").into_response()
    }
}
