//! Minimal XML document model for the report.
//!
//! The report format is JUnit-shaped XML. The document is small and fully
//! under our control, so it is rendered by hand: an element tree with
//! ordered attributes, escaped text, and a pretty renderer whose failure
//! falls back to a compact-but-valid rendering instead of aborting.

use std::fmt::Write as _;

/// Strip characters that are illegal in XML 1.0 text content.
///
/// Covers `\x00`–`\x08`, `\x0b`, `\x0c`, `\x0e`–`\x1f` and the
/// non-characters `\u{fffe}`/`\u{ffff}`. Harness output is arbitrary bytes
/// decoded lossily, so these do show up in practice.
pub fn sanitize_text(s: &str) -> String {
    s.chars()
        .filter(|&c| {
            !matches!(c,
                '\u{00}'..='\u{08}' | '\u{0b}' | '\u{0c}' | '\u{0e}'..='\u{1f}'
                | '\u{fffe}' | '\u{ffff}')
        })
        .collect()
}

fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// One XML element: name, ordered attributes, optional text, children.
///
/// Text and attribute values are sanitized and escaped at render time, so
/// callers can store raw harness output directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    attrs: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Builder-style attribute append (insertion order is preserved).
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((key.into(), value.into()));
        self
    }

    /// Builder-style text content.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set text content in place.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    /// Append a child element.
    pub fn push_child(&mut self, child: XmlElement) {
        self.children.push(child);
    }

    /// Builder-style child append.
    pub fn child(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }

    fn open_tag(&self) -> String {
        let mut tag = format!("<{}", self.name);
        for (key, value) in &self.attrs {
            let value = escape_attr(&sanitize_text(value));
            tag.push_str(&format!(" {key}=\"{value}\""));
        }
        tag
    }

    fn rendered_text(&self) -> Option<String> {
        self.text
            .as_deref()
            .map(|t| escape_text(&sanitize_text(t)))
    }

    /// Render without indentation. Infallible; this is the fallback path.
    pub fn render_compact(&self) -> String {
        let mut out = String::new();
        self.write_compact(&mut out);
        out
    }

    fn write_compact(&self, out: &mut String) {
        out.push_str(&self.open_tag());
        let text = self.rendered_text();
        if text.is_none() && self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        if let Some(text) = text {
            out.push_str(&text);
        }
        for child in &self.children {
            child.write_compact(out);
        }
        out.push_str(&format!("</{}>", self.name));
    }

    /// Render with two-space indentation, one element per line.
    ///
    /// Text content stays inline with its element so multi-line output
    /// blocks keep their own layout.
    pub fn render_pretty(&self) -> Result<String, std::fmt::Error> {
        let mut out = String::new();
        self.write_pretty(&mut out, 0)?;
        Ok(out)
    }

    fn write_pretty(&self, out: &mut String, depth: usize) -> std::fmt::Result {
        let indent = "  ".repeat(depth);
        write!(out, "{indent}{}", self.open_tag())?;
        let text = self.rendered_text();
        if text.is_none() && self.children.is_empty() {
            writeln!(out, "/>")?;
            return Ok(());
        }
        write!(out, ">")?;
        if let Some(text) = &text {
            write!(out, "{text}")?;
        }
        if self.children.is_empty() {
            writeln!(out, "</{}>", self.name)?;
            return Ok(());
        }
        writeln!(out)?;
        for child in &self.children {
            child.write_pretty(out, depth + 1)?;
        }
        // Mixed text+children keeps text before the children block.
        writeln!(out, "{indent}</{}>", self.name)?;
        Ok(())
    }

    /// Full document: XML declaration plus the pretty-rendered tree, falling
    /// back to the compact rendering if formatting fails.
    pub fn to_document(&self) -> String {
        let body = self
            .render_pretty()
            .unwrap_or_else(|_| self.render_compact());
        format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{body}")
    }
}
