//! Markup serialization for transformed trees

use crate::tree::{Element, Node};

/// Header prepended to standalone image documents.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"#;

/// Serialize an element and its subtree. Every element is written with an
/// explicit closing tag and attributes keep their stored order.
pub fn to_markup(el: &Element) -> String {
    let mut out = String::new();
    write_element(el, &mut out);
    out
}

/// Serialize an element as a self-contained image document.
pub fn to_standalone_document(el: &Element) -> String {
    let mut out = String::from(XML_DECLARATION);
    write_element(el, &mut out);
    out
}

fn write_element(el: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&el.name);
    for (k, v) in el.attrs.iter() {
        out.push(' ');
        out.push_str(k);
        out.push_str("=\"");
        out.push_str(&escape_attr(v));
        out.push('"');
    }
    out.push('>');
    for child in &el.children {
        match child {
            Node::Element(e) => write_element(e, out),
            Node::Text(t) => out.push_str(&escape_text(t)),
            Node::Comment(c) => {
                out.push_str("<!--");
                out.push_str(c);
                out.push_str("-->");
            }
        }
    }
    out.push_str("</");
    out.push_str(&el.name);
    out.push('>');
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}
