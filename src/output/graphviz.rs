//! GraphViz (DOT) sink and quoting helpers.

use super::Sink;
use crate::models::Attributes;
use std::io::{self, Write};

/// Writes DOT statements with tab indentation per nesting level.
pub struct GraphViz<W: Write> {
    out: W,
    indent: usize,
}

impl<W: Write> GraphViz<W> {
    pub fn new(out: W) -> GraphViz<W> {
        GraphViz { out, indent: 0 }
    }

    /// Give back the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.out, "{}{line}", "\t".repeat(self.indent))
    }
}

impl<W: Write> Sink for GraphViz<W> {
    fn write_statement(&mut self, text: &str) -> io::Result<()> {
        self.write_line(&format!("{text};"))
    }

    fn open_group(&mut self, label: &str) -> io::Result<()> {
        self.write_line(&format!("{label} {{"))?;
        self.indent += 1;
        Ok(())
    }

    fn close_group(&mut self, label: &str) -> io::Result<()> {
        self.indent = self.indent.saturating_sub(1);
        self.write_line(&format!("}} // {label}"))
    }
}

/// Quote a DOT identifier, escaping embedded double quotes.
pub fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\\\""))
}

/// Render an attribute value: HTML-like labels (`<...>`) stay raw, everything
/// else is quoted.
pub fn attr_value(value: &str) -> String {
    if value.starts_with('<') && value.ends_with('>') {
        value.to_string()
    } else {
        quote(value)
    }
}

/// `key=value` pairs separated by spaces, in key order.
pub fn attr_list(attrs: &Attributes) -> String {
    attrs
        .iter()
        .map(|(key, value)| format!("{key}={}", attr_value(value)))
        .collect::<Vec<String>>()
        .join(" ")
}

/// Append an attribute list to `expr` when there is one.
pub fn styled(expr: &str, attrs: &Attributes) -> String {
    if attrs.is_empty() {
        expr.to_string()
    } else {
        format!("{expr} [{}]", attr_list(attrs))
    }
}

/// Escape text for use inside an HTML-like label.
pub fn html_escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
