//! RFox Calendar
//!
//! Fetches a public profile's contribution calendar, recolors and reshapes
//! the calendar SVG, and hands it back either as an embeddable fragment with
//! its caption or as a standalone `image/svg+xml` document.
//!
//! # Pipeline
//!
//! - **Fetch** ([`fetch`]): one GET against the upstream site per request
//! - **Parse** ([`document`]): best-effort HTML parsing with selector queries
//! - **Transform** ([`transform`]): sizing, label hiding, per-cell colors
//! - **Serialize** ([`serialize`]): fragment markup or standalone document
//!
//! # Example
//!
//! ```
//! use rfcalendar::{document::Document, transform, RenderOptions, RenderedCalendar};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let html = r#"<h2>3 contributions</h2>
//! <svg class="js-calendar-graph-svg" width="722" height="112">
//!   <g><g><rect data-level="3"></rect></g></g>
//! </svg>"#;
//!
//! let doc = Document::parse(html);
//! match transform::render(&doc, &RenderOptions::default())? {
//!     RenderedCalendar::Fragment { svg, contributions } => {
//!         assert!(svg.contains(r##"fill="#26a641""##));
//!         assert_eq!(contributions, "3 contributions");
//!     }
//!     RenderedCalendar::Image(_) => unreachable!(),
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod config;
pub mod document;
pub mod fetch;
pub mod pipeline;
pub mod serialize;
pub mod transform;
pub mod tree;
pub mod web;

pub use config::ServerConfig;
pub use fetch::UpstreamClient;
pub use pipeline::CalendarService;

/// Colors applied to the calendar.
///
/// `levels[n]` fills day cells at activity level `n` (0 = no activity,
/// 4 = highest). `text` colors the month labels. Values are passed through
/// verbatim, so any CSS color string works and nothing is validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorConfig {
    pub levels: [String; 5],
    pub text: String,
}

impl ColorConfig {
    /// Color for an activity level, `None` outside 0..=4.
    pub fn level(&self, level: usize) -> Option<&str> {
        self.levels.get(level).map(String::as_str)
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            levels: [
                "#161b22".to_string(),
                "#0e4429".to_string(),
                "#006d32".to_string(),
                "#26a641".to_string(),
                "#39d353".to_string(),
            ],
            text: "white".to_string(),
        }
    }
}

/// Output encoding for a rendered calendar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderMode {
    /// Markup fragment for embedding, returned with the caption
    #[default]
    Fragment,
    /// Standalone SVG document with the original dimensions
    Image,
}

impl RenderMode {
    pub fn from_image_flag(get_image: bool) -> Self {
        if get_image {
            RenderMode::Image
        } else {
            RenderMode::Fragment
        }
    }

    pub fn is_image(self) -> bool {
        self == RenderMode::Image
    }
}

/// Per-request rendering options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub colors: ColorConfig,
    pub mode: RenderMode,
}

/// Final output of the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedCalendar {
    /// Fragment markup plus the caption text
    Fragment { svg: String, contributions: String },
    /// Standalone SVG document
    Image(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_palette() {
        let colors = ColorConfig::default();
        assert_eq!(colors.level(0), Some("#161b22"));
        assert_eq!(colors.level(4), Some("#39d353"));
        assert_eq!(colors.level(5), None);
        assert_eq!(colors.text, "white");
    }

    #[test]
    fn test_render_mode_defaults_to_fragment() {
        assert_eq!(RenderOptions::default().mode, RenderMode::Fragment);
        assert!(RenderMode::from_image_flag(true).is_image());
        assert!(!RenderMode::from_image_flag(false).is_image());
    }
}
