//! Calendar graphic transform.
//!
//! Rewrites the calendar SVG selected from an upstream document:
//!
//! 1. fluid sizing and the SVG namespace
//! 2. a hidden tooltip placeholder (fragment output only)
//! 3. weekday labels hidden, crowded month labels collapsed
//! 4. day cells filled from the configured palette
//!
//! and extracts the caption heading. [`finalize`] then produces the output
//! for the requested [`RenderMode`].

use crate::document::{self, Document};
use crate::serialize;
use crate::tree::{Element, Node};
use crate::{ColorConfig, Error, RenderMode, RenderOptions, RenderedCalendar, Result};
use log::{debug, warn};

/// Class marker of the calendar graphic.
pub const GRAPHIC_SELECTOR: &str = ".js-calendar-graph-svg";

pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// Vertical offsets of the four weekday label rows.
pub const WEEKDAY_LABEL_OFFSETS: [&str; 4] = ["8", "32", "57", "81"];

/// Month labels closer than this to the following label are hidden.
pub const MONTH_LABEL_MIN_GAP: f64 = 27.0;

pub const HIDDEN_STYLE: &str = "display: none";

pub const FONT_STYLE: &str = "font-family: \"Roboto\", \"-apple-system\", \"Helvetica Neue\", \
     Helvetica, Arial, sans-serif; font-size: 14px; line-height: 1.5";

pub const TOOLTIP_STYLE: &str = "position: absolute; display: none; background-color: #6e7680; \
     border-radius: .4em; font-size: .85em; padding: 8px";

/// Width/height of the graphic before it was made fluid
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OriginalSize {
    pub width: Option<String>,
    pub height: Option<String>,
}

/// A transformed calendar, not yet serialized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Calendar {
    pub graphic: Element,
    /// Text of the first `h2` in the document, if any
    pub caption: Option<String>,
    pub original_size: OriginalSize,
    pub mode: RenderMode,
}

/// Transform and serialize in one step.
pub fn render(doc: &Document, options: &RenderOptions) -> Result<RenderedCalendar> {
    finalize(transform(doc, options)?)
}

/// Locate the calendar graphic in `doc` and rewrite it according to `options`.
pub fn transform(doc: &Document, options: &RenderOptions) -> Result<Calendar> {
    let candidates = doc.select_all(GRAPHIC_SELECTOR)?;
    let source = candidates.first().copied().ok_or(Error::GraphicNotFound)?;
    if candidates.len() > 1 {
        warn!(
            "{} calendar graphics in upstream document, using the first",
            candidates.len()
        );
    }

    let mut graphic = document::to_owned_tree(source);
    let original_size = make_fluid(&mut graphic);

    if !options.mode.is_image() {
        graphic.append_child(tooltip_placeholder());
    }

    style_labels(&mut graphic, &options.colors, options.mode);
    style_months(&mut graphic, &options.colors, options.mode, 0)?;

    let caption = doc.find_first("h2").map(document::text_of);
    if caption.is_none() {
        debug!("no caption heading in upstream document");
    }

    Ok(Calendar {
        graphic,
        caption,
        original_size,
        mode: options.mode,
    })
}

/// Serialize a transformed calendar for its mode.
///
/// Fragment output requires a caption. Image output drops the overflow style
/// and restores the original dimensions.
pub fn finalize(calendar: Calendar) -> Result<RenderedCalendar> {
    let Calendar {
        mut graphic,
        caption,
        original_size,
        mode,
    } = calendar;

    match mode {
        RenderMode::Fragment => {
            let contributions = caption.ok_or_else(|| Error::MissingElement("h2".into()))?;
            Ok(RenderedCalendar::Fragment {
                svg: serialize::to_markup(&graphic),
                contributions,
            })
        }
        RenderMode::Image => {
            graphic.remove_attr("style");
            restore_attr(&mut graphic, "height", original_size.height);
            restore_attr(&mut graphic, "width", original_size.width);
            Ok(RenderedCalendar::Image(serialize::to_standalone_document(
                &graphic,
            )))
        }
    }
}

fn make_fluid(graphic: &mut Element) -> OriginalSize {
    let original = OriginalSize {
        width: graphic.attr("width").map(str::to_string),
        height: graphic.attr("height").map(str::to_string),
    };
    graphic.set_attr("style", "overflow: scroll");
    graphic.set_attr("xmlns", SVG_NAMESPACE);
    graphic.remove_attr("height");
    graphic.set_attr("width", "100%");
    original
}

fn restore_attr(el: &mut Element, key: &str, value: Option<String>) {
    match value {
        Some(v) => el.set_attr(key, v),
        None => {
            el.remove_attr(key);
        }
    }
}

fn tooltip_placeholder() -> Element {
    Element::new("div")
        .with_attr("id", "tooltip")
        .with_attr("style", TOOLTIP_STYLE)
}

fn is_weekday_label(label: &Element) -> bool {
    label
        .attr("dy")
        .is_some_and(|dy| WEEKDAY_LABEL_OFFSETS.contains(&dy))
}

fn coordinate(label: &Element) -> Option<f64> {
    label.attr("x")?.trim().parse().ok()
}

fn hide(label: &mut Element) {
    label.set_attr("style", HIDDEN_STYLE);
}

/// Hide weekday labels, collapse month labels that would overlap, and color
/// whatever is left.
///
/// When two labels sit closer than [`MONTH_LABEL_MIN_GAP`], the earlier one is
/// hidden and the later one is kept.
pub fn style_labels(graphic: &mut Element, colors: &ColorConfig, mode: RenderMode) {
    let mut labels = graphic.descendants_named_mut("text");
    for i in 0..labels.len() {
        if is_weekday_label(&*labels[i]) {
            hide(&mut *labels[i]);
            continue;
        }

        if i > 0 {
            if let (Some(x), Some(prev_x)) = (coordinate(&*labels[i]), coordinate(&*labels[i - 1]))
            {
                if x - prev_x < MONTH_LABEL_MIN_GAP {
                    hide(&mut *labels[i - 1]);
                }
            }
        }

        let label = &mut *labels[i];
        label.set_attr("fill", colors.text.as_str());
        label.set_attr("shape-rendering", "crispedges");
        if mode.is_image() {
            label.set_attr("style", FONT_STYLE);
        }
    }
}

/// Style month groups (`g` nested in another `g`) and fill their day cells.
///
/// `depth` is the number of `g` elements enclosing the children of `el`.
fn style_months(
    el: &mut Element,
    colors: &ColorConfig,
    mode: RenderMode,
    depth: usize,
) -> Result<()> {
    for child in el.children.iter_mut() {
        let Node::Element(child) = child else {
            continue;
        };
        let mut child_depth = depth;
        match child.name.as_str() {
            "g" => {
                child_depth += 1;
                if child_depth >= 2 && mode.is_image() {
                    child.set_attr("style", FONT_STYLE);
                }
            }
            "rect" if depth >= 2 => fill_day(child, colors)?,
            _ => {}
        }
        style_months(child, colors, mode, child_depth)?;
    }
    Ok(())
}

fn fill_day(day: &mut Element, colors: &ColorConfig) -> Result<()> {
    let raw = day
        .attr("data-level")
        .ok_or_else(|| Error::InvalidLevel("day cell without data-level".into()))?;
    let color = raw
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|level| colors.level(level))
        .ok_or_else(|| Error::InvalidLevel(format!("data-level=\"{}\"", raw)))?
        .to_string();
    day.set_attr("fill", color);
    Ok(())
}
