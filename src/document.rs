//! HTML parsing and selection over fetched upstream markup.
//!
//! Parsing never fails: html5ever always produces a best-effort tree. Queries
//! report absence through `Option` so callers decide what is fatal.

use crate::tree::{Element, Node};
use crate::{Error, Result};
use scraper::{ElementRef, Html, Selector};

/// A parsed upstream document.
pub struct Document {
    html: Html,
}

impl Document {
    pub fn parse(raw: &str) -> Self {
        Self {
            html: Html::parse_document(raw),
        }
    }

    /// First element matching a CSS selector.
    pub fn select_first(&self, selector: &str) -> Result<Option<ElementRef<'_>>> {
        let sel = compile(selector)?;
        Ok(self.html.select(&sel).next())
    }

    /// All elements matching a CSS selector, in document order.
    pub fn select_all(&self, selector: &str) -> Result<Vec<ElementRef<'_>>> {
        let sel = compile(selector)?;
        Ok(self.html.select(&sel).collect())
    }

    /// First element with the given tag name.
    pub fn find_first(&self, tag: &str) -> Option<ElementRef<'_>> {
        self.html
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == tag)
    }
}

/// Concatenated text of an element, untrimmed.
pub fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>()
}

/// Copy a parsed subtree into an owned, mutable tree.
pub fn to_owned_tree(el: ElementRef<'_>) -> Element {
    let mut out = Element::new(el.value().name());
    for (k, v) in el.value().attrs() {
        out.set_attr(k, v);
    }
    for child in el.children() {
        match child.value() {
            scraper::Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    out.children.push(Node::Element(to_owned_tree(child_el)));
                }
            }
            scraper::Node::Text(t) => out.children.push(Node::Text((**t).to_string())),
            scraper::Node::Comment(c) => out.children.push(Node::Comment((**c).to_string())),
            _ => {}
        }
    }
    out
}

fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| Error::SelectorError(format!("{}: {:?}", selector, e)))
}
