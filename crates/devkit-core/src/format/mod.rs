//! Best-effort XML pretty-printing and minification.
//!
//! Both operations work on a flat token stream rather than a parsed tree, so
//! they accept malformed input: unbalanced closing tags simply stop reducing
//! the indent at zero. Validation is a separate step
//! ([`crate::validate_xml`]).

mod token;

pub use token::{tokenize, Token};

use tracing::trace;

/// Widest indentation accepted by [`FormatOptions::with_indent`].
pub const MAX_INDENT: usize = 16;

/// Options controlling [`format_with`].
///
/// ```
/// # use devkit_core::format::FormatOptions;
/// let opts = FormatOptions::default().with_indent(4);
/// assert_eq!(opts.indent(), 4);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormatOptions {
    indent: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self { indent: 2 }
    }
}

impl FormatOptions {
    /// Number of spaces per nesting level.
    #[must_use]
    pub fn indent(&self) -> usize {
        self.indent
    }

    /// Returns a copy using `width` spaces per nesting level, capped at
    /// [`MAX_INDENT`].
    ///
    /// ```
    /// # use devkit_core::format::{FormatOptions, MAX_INDENT};
    /// assert_eq!(FormatOptions::default().with_indent(usize::MAX).indent(), MAX_INDENT);
    /// ```
    #[must_use]
    pub fn with_indent(mut self, width: usize) -> Self {
        self.indent = width.min(MAX_INDENT);
        self
    }
}

/// Removes whitespace that sits strictly between a `>` and the next `<`,
/// then trims both ends.
///
/// Whitespace inside text content is left alone.
///
/// ```
/// let xml = "<a>\n  <b> keep  this </b>\n</a>\n";
/// assert_eq!(devkit_core::format::minify(xml), "<a><b> keep  this </b></a>");
/// ```
#[must_use]
pub fn minify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input.trim();

    while let Some(pos) = rest.find('>') {
        out.push_str(&rest[..=pos]);
        rest = &rest[pos + 1..];
        let trimmed = rest.trim_start();
        if trimmed.starts_with('<') {
            rest = trimmed;
        }
    }
    out.push_str(rest);
    out
}

/// Pretty-prints XML with two-space indentation.
///
/// ```
/// let pretty = devkit_core::format::format("<a><b>1</b><c/></a>");
/// assert_eq!(pretty, "<a>\n  <b>1</b>\n  <c/>\n</a>");
/// ```
#[must_use]
pub fn format(input: &str) -> String {
    format_with(input, &FormatOptions::default())
}

/// Pretty-prints XML using the given options.
///
/// Each tag goes on its own line. Opening tags indent what follows, closing
/// tags outdent before they are written (never below zero), and text,
/// self-closing tags, and markup keep the current depth. An element with no
/// child elements stays on one line together with its text, CDATA, and
/// comments.
#[must_use]
pub fn format_with(input: &str, options: &FormatOptions) -> String {
    let minified = minify(input);
    let tokens = tokenize(&minified);
    let mut lines: Vec<String> = Vec::with_capacity(tokens.len());
    let mut depth = 0usize;
    let mut rest = tokens.as_slice();

    while let Some((token, tail)) = rest.split_first() {
        if let Some((leaf, remaining)) = inline_leaf(rest) {
            lines.push(indented(depth, options, &leaf));
            rest = remaining;
            continue;
        }
        match token {
            Token::Close(tag) => {
                depth = depth.saturating_sub(1);
                lines.push(indented(depth, options, tag));
            }
            Token::Open(tag) => {
                lines.push(indented(depth, options, tag));
                depth += 1;
            }
            other => lines.push(indented(depth, options, other.as_str())),
        }
        rest = tail;
    }

    trace!(lines = lines.len(), unclosed = depth, "formatted XML");
    lines.join("\n")
}

fn inline_leaf<'t, 'a>(tokens: &'t [Token<'a>]) -> Option<(String, &'t [Token<'a>])> {
    let (Token::Open(open), body) = tokens.split_first()? else {
        return None;
    };
    let len = body
        .iter()
        .take_while(|token| matches!(token, Token::Text(_) | Token::Markup(_)))
        .count();
    match body.get(len)? {
        Token::Close(close) if tag_name(open) == tag_name(close) => {
            let line: String = tokens[..len + 2].iter().map(Token::as_str).collect();
            Some((line, &tokens[len + 2..]))
        }
        _ => None,
    }
}

fn tag_name(tag: &str) -> &str {
    let body = tag.trim_start_matches('<').trim_start_matches('/');
    let end = body
        .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
        .unwrap_or(body.len());
    &body[..end]
}

fn indented(depth: usize, options: &FormatOptions, token: &str) -> String {
    let mut line = " ".repeat(depth.saturating_mul(options.indent));
    line.push_str(token);
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minify_keeps_text_whitespace() {
        assert_eq!(minify("  <a> x </a>  "), "<a> x </a>");
        assert_eq!(minify("<a>\r\n\t<b/>\n</a>"), "<a><b/></a>");
    }

    #[test]
    fn minify_of_plain_text_is_trimmed_text() {
        assert_eq!(minify("  hello world "), "hello world");
    }

    #[test]
    fn format_nests_and_inlines_leaves() {
        let input = "<?xml version=\"1.0\"?><root id=\"1\"><item>value</item><list><x/><y></y></list></root>";
        let expected = "<?xml version=\"1.0\"?>\n<root id=\"1\">\n  <item>value</item>\n  <list>\n    <x/>\n    <y></y>\n  </list>\n</root>";
        assert_eq!(format(input), expected);
    }

    #[test]
    fn format_puts_mixed_text_on_own_line() {
        assert_eq!(format("<p>hi<b>x</b></p>"), "<p>\n  hi\n  <b>x</b>\n</p>");
    }

    #[test]
    fn format_inlines_text_with_cdata_and_comments() {
        for xml in ["<a>t<![CDATA[x]]></a>", "<a><!--c-->t</a>", "<r><a><!--c--></a></r>"] {
            let pretty = format(xml);
            assert_eq!(minify(&pretty), minify(xml), "{pretty}");
        }
        let pretty = format("<r><a>t<![CDATA[<x>]]></a></r>");
        assert_eq!(pretty, "<r>\n  <a>t<![CDATA[<x>]]></a>\n</r>");
        assert_eq!(format("<a><!--c-->t</a>"), "<a><!--c-->t</a>");
    }

    #[test]
    fn format_floors_depth_at_zero() {
        assert_eq!(format("</a></b><c/>"), "</a>\n</b>\n<c/>");
    }

    #[test]
    fn format_does_not_inline_mismatched_tags() {
        assert_eq!(format("<a>t</b>"), "<a>\n  t\n</b>");
    }

    #[test]
    fn format_respects_indent_width() {
        let opts = FormatOptions::default().with_indent(4);
        assert_eq!(format_with("<a><b/></a>", &opts), "<a>\n    <b/>\n</a>");
        let flat = FormatOptions::default().with_indent(0);
        assert_eq!(format_with("<a><b/></a>", &flat), "<a>\n<b/>\n</a>");
    }

    #[test]
    fn oversized_indent_is_capped() {
        let opts = FormatOptions::default().with_indent(usize::MAX);
        let pretty = format_with("<a><b><c/></b></a>", &opts);
        assert_eq!(pretty, format!("<a>\n{0}<b>\n{0}{0}<c/>\n{0}</b>\n</a>", " ".repeat(16)));
    }

    #[test]
    fn format_of_empty_input_is_empty() {
        assert_eq!(format("   "), "");
    }

    #[test]
    fn tag_name_extraction() {
        assert_eq!(tag_name("<a x=\"1\">"), "a");
        assert_eq!(tag_name("</ns:item>"), "ns:item");
        assert_eq!(tag_name("<b/>"), "b");
    }
}
