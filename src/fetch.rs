//! Upstream fetcher: one GET per call for a profile's contribution calendar.
//!
//! No retries, no caching and no timeout beyond the transport default.

use crate::{Error, Result};
use reqwest::header::USER_AGENT;
use reqwest::Client;
use url::Url;

/// Default upstream site
pub const DEFAULT_UPSTREAM: &str = "https://github.com";

const AGENT: &str = concat!("rfcalendar/", env!("CARGO_PKG_VERSION"));

/// Raw upstream response
#[derive(Debug, Clone)]
pub struct UpstreamPage {
    pub status: u16,
    pub body: String,
}

/// Client for the upstream contributions page.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
    base: Url,
}

impl UpstreamClient {
    /// Create a client rooted at `base` (e.g. `https://github.com`).
    pub fn new(base: &str) -> Result<Self> {
        let base = Url::parse(base)
            .map_err(|e| Error::ConfigError(format!("Invalid upstream URL {}: {}", base, e)))?;
        if base.cannot_be_a_base() {
            return Err(Error::ConfigError(format!("Upstream URL {} cannot be a base", base)));
        }

        let client = Client::builder()
            .build()
            .map_err(|e| Error::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, base })
    }

    /// `{base}/users/{identifier}/contributions`, with the identifier as one
    /// percent-encoded path segment.
    pub fn contributions_url(&self, identifier: &str) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["users", identifier, "contributions"]);
        }
        url
    }

    /// Fetch the contributions markup for `identifier`.
    ///
    /// Transport failures and non-success statuses are both errors.
    pub async fn fetch(&self, identifier: &str) -> Result<UpstreamPage> {
        let url = self.contributions_url(identifier);
        log::debug!("GET {}", url);

        let resp = self
            .client
            .get(url.clone())
            .header(USER_AGENT, AGENT)
            .send()
            .await
            .map_err(|e| Error::UpstreamError(format!("Failed to fetch {}: {}", url, e)))?;

        let status = resp.status();
        if !status.is_success() {
            log::warn!("upstream {} responded {}", url, status);
            return Err(Error::UpstreamStatus(status.as_u16()));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| Error::UpstreamError(format!("Failed to read response body: {}", e)))?;

        Ok(UpstreamPage {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serve_once(status: u16, body: &'static str) -> String {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr();
        std::thread::spawn(move || {
            if let Ok(request) = server.recv() {
                let response = tiny_http::Response::from_string(body).with_status_code(status);
                let _ = request.respond(response);
            }
        });
        format!("http://{}", addr)
    }

    #[test]
    fn builds_contributions_url() {
        let client = UpstreamClient::new(DEFAULT_UPSTREAM).unwrap();
        assert_eq!(
            client.contributions_url("octocat").as_str(),
            "https://github.com/users/octocat/contributions"
        );

        let client = UpstreamClient::new("http://localhost:9000/mirror/").unwrap();
        assert_eq!(
            client.contributions_url("a b/c").as_str(),
            "http://localhost:9000/mirror/users/a%20b%2Fc/contributions"
        );
    }

    #[test]
    fn rejects_unusable_base() {
        assert!(matches!(UpstreamClient::new("not a url"), Err(Error::ConfigError(_))));
        assert!(matches!(
            UpstreamClient::new("mailto:someone@example.com"),
            Err(Error::ConfigError(_))
        ));
    }

    #[tokio::test]
    async fn fetch_returns_body_on_success() {
        let base = serve_once(200, "<h2>hello</h2>");
        let client = UpstreamClient::new(&base).unwrap();
        let page = client.fetch("octocat").await.expect("fetch");
        assert_eq!(page.status, 200);
        assert_eq!(page.body, "<h2>hello</h2>");
    }

    #[tokio::test]
    async fn fetch_surfaces_non_success_status() {
        let base = serve_once(404, "Not Found");
        let client = UpstreamClient::new(&base).unwrap();
        let err = client.fetch("ghost").await.unwrap_err();
        assert!(matches!(err, Error::UpstreamStatus(404)));
        assert!(err.is_upstream());
    }

    #[tokio::test]
    async fn fetch_surfaces_transport_errors() {
        // Bind then drop a listener to get a port with nothing behind it.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let client = UpstreamClient::new(&format!("http://127.0.0.1:{}", port)).unwrap();
        assert!(matches!(
            client.fetch("octocat").await,
            Err(Error::UpstreamError(_))
        ));
    }
}
