//! Owned markup tree used by the transform stage.
//!
//! `scraper` documents are read-only, so the calendar subtree is copied into
//! these plain types before it is rewritten. Each request owns its tree.

/// Ordered attribute list with unique keys.
///
/// `get` distinguishes an absent attribute (`None`) from one that is present
/// but empty (`Some("")`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<(String, String)>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Replace the value in place when the key exists, otherwise append it.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut attrs = Attributes::new();
        for (k, v) in iter {
            attrs.set(k, v);
        }
        attrs
    }
}

/// A child of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

/// An element with its attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attrs: Attributes,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Attributes::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.set(key, value);
        self
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key)
    }

    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attrs.set(key, value);
    }

    pub fn remove_attr(&mut self, key: &str) -> Option<String> {
        self.attrs.remove(key)
    }

    pub fn append_child(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Mutable references to every descendant named `name`, in document order.
    ///
    /// A matching element's own subtree is not searched, so the returned
    /// references never overlap.
    pub fn descendants_named_mut<'a>(&'a mut self, name: &str) -> Vec<&'a mut Element> {
        let mut out = Vec::new();
        for child in self.children.iter_mut() {
            if let Node::Element(el) = child {
                collect_named(el, name, &mut out);
            }
        }
        out
    }

    /// Every descendant named `name`, in document order.
    pub fn descendants_named<'a>(&'a self, name: &str) -> Vec<&'a Element> {
        let mut out = Vec::new();
        let mut stack: Vec<&Element> = self.child_elements().collect();
        stack.reverse();
        while let Some(el) = stack.pop() {
            if el.name == name {
                out.push(el);
            }
            let before = stack.len();
            stack.extend(el.child_elements());
            stack[before..].reverse();
        }
        out
    }
}

fn collect_named<'a>(el: &'a mut Element, name: &str, out: &mut Vec<&'a mut Element>) {
    if el.name == name {
        out.push(el);
        return;
    }
    for child in el.children.iter_mut() {
        if let Node::Element(inner) = child {
            collect_named(inner, name, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_empty_attributes_differ() {
        let el = Element::new("rect").with_attr("data-level", "");
        assert_eq!(el.attr("data-level"), Some(""));
        assert_eq!(el.attr("fill"), None);
    }

    #[test]
    fn set_replaces_in_place_and_appends_new_keys() {
        let mut attrs: Attributes = [("width", "10"), ("height", "5")].into_iter().collect();
        attrs.set("width", "100%");
        attrs.set("style", "overflow: scroll");
        let keys: Vec<_> = attrs.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["width", "height", "style"]);
        assert_eq!(attrs.get("width"), Some("100%"));
    }

    #[test]
    fn remove_returns_previous_value() {
        let mut el = Element::new("svg").with_attr("height", "128");
        assert_eq!(el.remove_attr("height").as_deref(), Some("128"));
        assert_eq!(el.remove_attr("height"), None);
        assert!(el.attrs.is_empty());
    }

    #[test]
    fn descendants_are_in_document_order() {
        let mut root = Element::new("svg");
        let mut g = Element::new("g");
        g.append_child(Element::new("text").with_attr("x", "1"));
        g.append_child(Element::new("rect"));
        root.append_child(g);
        root.append_child(Element::new("text").with_attr("x", "2"));

        let xs: Vec<_> = root
            .descendants_named("text")
            .iter()
            .map(|t| t.attr("x").unwrap_or_default().to_string())
            .collect();
        assert_eq!(xs, vec!["1", "2"]);

        for t in root.descendants_named_mut("text") {
            t.set_attr("fill", "white");
        }
        assert!(root
            .descendants_named("text")
            .iter()
            .all(|t| t.attr("fill") == Some("white")));
    }
}
