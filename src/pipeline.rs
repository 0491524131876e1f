//! Request orchestration: fetch, parse, transform, serialize.

use crate::document::Document;
use crate::fetch::UpstreamClient;
use crate::{transform, RenderOptions, RenderedCalendar, Result};
use log::{debug, info};

/// Drives one calendar request end to end.
///
/// Holds no per-request state; clones share the upstream connection pool.
#[derive(Debug, Clone)]
pub struct CalendarService {
    upstream: UpstreamClient,
}

impl CalendarService {
    pub fn new(upstream: UpstreamClient) -> Self {
        Self { upstream }
    }

    /// Fetch `identifier`'s calendar and render it with `options`.
    pub async fn render(
        &self,
        identifier: &str,
        options: &RenderOptions,
    ) -> Result<RenderedCalendar> {
        debug!("rendering calendar for {} ({:?})", identifier, options.mode);
        let page = self.upstream.fetch(identifier).await?;
        let rendered = render_markup(&page.body, options)?;
        info!(
            "rendered {:?} calendar for {} (upstream {}, {} bytes)",
            options.mode,
            identifier,
            page.status,
            page.body.len()
        );
        Ok(rendered)
    }
}

/// Parse and transform already-fetched upstream markup.
///
/// Kept synchronous so the parsed document never lives across an await.
pub fn render_markup(raw: &str, options: &RenderOptions) -> Result<RenderedCalendar> {
    let doc = Document::parse(raw);
    transform::render(&doc, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, RenderMode};

    const PAGE: &str = r#"<h2>7 contributions</h2>
        <svg class="js-calendar-graph-svg" width="100" height="50">
          <g><g><rect data-level="3"></rect></g></g>
        </svg>"#;

    #[test]
    fn render_markup_produces_fragment_by_default() {
        match render_markup(PAGE, &RenderOptions::default()).unwrap() {
            RenderedCalendar::Fragment { svg, contributions } => {
                assert!(svg.contains(r##"fill="#26a641""##));
                assert_eq!(contributions, "7 contributions");
            }
            other => panic!("unexpected output: {:?}", other),
        }
    }

    #[test]
    fn render_markup_reports_missing_graphic() {
        assert!(matches!(
            render_markup("<html></html>", &RenderOptions::default()),
            Err(Error::GraphicNotFound)
        ));
    }

    #[tokio::test]
    async fn service_fetches_then_renders_image() {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr();
        std::thread::spawn(move || {
            if let Ok(request) = server.recv() {
                assert_eq!(request.url(), "/users/octocat/contributions");
                let _ = request.respond(tiny_http::Response::from_string(PAGE));
            }
        });

        let upstream = UpstreamClient::new(&format!("http://{}", addr)).unwrap();
        let service = CalendarService::new(upstream);
        let options = RenderOptions {
            mode: RenderMode::Image,
            ..RenderOptions::default()
        };
        match service.render("octocat", &options).await.unwrap() {
            RenderedCalendar::Image(doc) => {
                assert!(doc.contains(r#"width="100""#));
                assert!(doc.contains(r#"height="50""#));
            }
            other => panic!("unexpected output: {:?}", other),
        }
    }
}
