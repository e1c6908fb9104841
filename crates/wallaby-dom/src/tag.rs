//! The `Tag` value object: one element's name, attributes, and closing
//! behavior, with opening/closing tag rendering.
//!
//! Attributes live in a plain vector so that serialization reproduces
//! insertion order; lookups are linear scans, which is the right trade for
//! the handful of attributes real-world tags carry.

use strum_macros::Display;

/// Quoting style recorded for an attribute value.
///
/// Unquoted values are stored with [`QuoteStyle::Double`] so that a
/// re-serialized document is always well-quoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum QuoteStyle {
    /// `key="value"`
    #[default]
    Double,
    /// `key='value'`
    Single,
}

impl QuoteStyle {
    /// The literal quote character for this style.
    #[must_use]
    pub const fn ch(self) -> char {
        match self {
            QuoteStyle::Double => '"',
            QuoteStyle::Single => '\'',
        }
    }
}

/// One attribute: lowercased name, optional value, and the quote style it
/// was written with.
///
/// A `None` value denotes a valueless attribute such as `disabled`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name, case-folded to lowercase at write time.
    pub name: String,
    /// Attribute value; `None` renders as a bare key.
    pub value: Option<String>,
    /// Quote style used when rendering the value.
    pub quote: QuoteStyle,
}

/// An element's name plus its ordered attribute list and closing flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    name: String,
    attrs: Vec<Attribute>,
    self_closing: bool,
    trailing_slash: bool,
}

impl Tag {
    /// Create a tag with the given name (case-folded to lowercase) and no
    /// attributes.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Tag {
            name: name.to_ascii_lowercase(),
            attrs: Vec::new(),
            self_closing: false,
            trailing_slash: true,
        }
    }

    /// The lowercased tag name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All attributes in insertion order.
    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attrs
    }

    /// Look up an attribute by name (case-insensitive).
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        let name = name.to_ascii_lowercase();
        self.attrs.iter().find(|a| a.name == name)
    }

    /// The value of an attribute, when present and non-bare.
    #[must_use]
    pub fn attribute_value(&self, name: &str) -> Option<&str> {
        self.attribute(name).and_then(|a| a.value.as_deref())
    }

    /// Set an attribute, updating an existing entry in place (keeping its
    /// position and quote style) or appending a new one.
    pub fn set_attribute(&mut self, name: &str, value: Option<&str>) {
        self.set_attribute_quoted(name, value, None);
    }

    /// Set an attribute with an explicit quote style. Passing `None` keeps
    /// the existing style for updates and defaults to double quotes for new
    /// entries.
    pub fn set_attribute_quoted(&mut self, name: &str, value: Option<&str>, quote: Option<QuoteStyle>) {
        let name = name.to_ascii_lowercase();
        if let Some(existing) = self.attrs.iter_mut().find(|a| a.name == name) {
            existing.value = value.map(str::to_string);
            if let Some(q) = quote {
                existing.quote = q;
            }
        } else {
            self.attrs.push(Attribute {
                name,
                value: value.map(str::to_string),
                quote: quote.unwrap_or_default(),
            });
        }
    }

    /// Remove an attribute by name. Returns whether anything was removed.
    pub fn remove_attribute(&mut self, name: &str) -> bool {
        let name = name.to_ascii_lowercase();
        let before = self.attrs.len();
        self.attrs.retain(|a| a.name != name);
        self.attrs.len() != before
    }

    /// Drop every attribute.
    pub fn clear_attributes(&mut self) {
        self.attrs.clear();
    }

    /// Whether this tag closes itself (no distinct closing tag).
    #[must_use]
    pub fn is_self_closing(&self) -> bool {
        self.self_closing
    }

    /// Mark the tag as self-closing or not.
    pub fn set_self_closing(&mut self, self_closing: bool) {
        self.self_closing = self_closing;
    }

    /// Whether a self-closing render carries the ` /` before `>`.
    #[must_use]
    pub fn has_trailing_slash(&self) -> bool {
        self.trailing_slash
    }

    /// Control whether a self-closing render writes ` />` or a bare `>`.
    pub fn set_trailing_slash(&mut self, trailing_slash: bool) {
        self.trailing_slash = trailing_slash;
    }

    /// Render the opening tag text, attributes in insertion order.
    ///
    /// A `None`-valued attribute renders as a bare key; values use their
    /// stored quote style. Self-closing tags end in ` />`, or `>` when the
    /// trailing slash has been disabled.
    #[must_use]
    pub fn opening_text(&self) -> String {
        let mut out = String::with_capacity(self.name.len() + 2);
        out.push('<');
        out.push_str(&self.name);
        for attr in &self.attrs {
            out.push(' ');
            out.push_str(&attr.name);
            if let Some(value) = &attr.value {
                let q = attr.quote.ch();
                out.push('=');
                out.push(q);
                out.push_str(value);
                out.push(q);
            }
        }
        if self.self_closing && self.trailing_slash {
            out.push_str(" />");
        } else {
            out.push('>');
        }
        out
    }

    /// Render the closing tag text; empty for self-closing tags.
    #[must_use]
    pub fn closing_text(&self) -> String {
        if self.self_closing {
            String::new()
        } else {
            format!("</{}>", self.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opening_text_renders_in_insertion_order() {
        let mut tag = Tag::new("A");
        tag.set_attribute("HREF", Some("x.html"));
        tag.set_attribute("title", Some("t"));
        assert_eq!(tag.opening_text(), "<a href=\"x.html\" title=\"t\">");
    }

    #[test]
    fn test_bare_attribute_renders_without_value() {
        let mut tag = Tag::new("input");
        tag.set_attribute("disabled", None);
        assert_eq!(tag.opening_text(), "<input disabled>");
    }

    #[test]
    fn test_single_quote_style_preserved() {
        let mut tag = Tag::new("p");
        tag.set_attribute_quoted("id", Some("main"), Some(QuoteStyle::Single));
        assert_eq!(tag.opening_text(), "<p id='main'>");
    }

    #[test]
    fn test_self_closing_render() {
        let mut tag = Tag::new("br");
        tag.set_self_closing(true);
        assert_eq!(tag.opening_text(), "<br />");
        assert_eq!(tag.closing_text(), "");

        tag.set_trailing_slash(false);
        assert_eq!(tag.opening_text(), "<br>");
    }

    #[test]
    fn test_update_keeps_position() {
        let mut tag = Tag::new("div");
        tag.set_attribute("class", Some("a"));
        tag.set_attribute("id", Some("x"));
        tag.set_attribute("class", Some("b"));
        assert_eq!(tag.opening_text(), "<div class=\"b\" id=\"x\">");
    }

    #[test]
    fn test_remove_attribute() {
        let mut tag = Tag::new("div");
        tag.set_attribute("class", Some("a"));
        assert!(tag.remove_attribute("CLASS"));
        assert!(!tag.remove_attribute("class"));
        assert_eq!(tag.opening_text(), "<div>");
    }
}
