/// A lexical piece of XML-like text.
///
/// The tokenizer is a lightweight structural scan, not a parser: it never
/// fails and never checks that tags balance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token<'a> {
    /// `<name ...>`
    Open(&'a str),
    /// `</name>`
    Close(&'a str),
    /// `<name ... />`
    SelfClosing(&'a str),
    /// Character data, including CDATA sections.
    Text(&'a str),
    /// Declarations, comments, doctypes, and processing instructions.
    Markup(&'a str),
}

impl<'a> Token<'a> {
    /// Source text of the token.
    #[must_use]
    pub fn as_str(&self) -> &'a str {
        match *self {
            Self::Open(s)
            | Self::Close(s)
            | Self::SelfClosing(s)
            | Self::Text(s)
            | Self::Markup(s) => s,
        }
    }

    /// Whether the token is a comment.
    #[must_use]
    pub fn is_comment(&self) -> bool {
        matches!(self, Self::Markup(s) if s.starts_with("<!--"))
    }
}

/// Splits `input` into tags and text runs.
///
/// A tag runs from `<` to the next `>`; comments and CDATA sections run to
/// their own terminators so that a `>` inside them does not end the token.
/// A `<` with no terminator turns the rest of the input into text.
///
/// ```
/// # use devkit_core::format::{tokenize, Token};
/// let tokens = tokenize("<a x=\"1\">hi<b/></a>");
/// assert_eq!(
///     tokens,
///     vec![
///         Token::Open("<a x=\"1\">"),
///         Token::Text("hi"),
///         Token::SelfClosing("<b/>"),
///         Token::Close("</a>"),
///     ]
/// );
/// ```
#[must_use]
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut rest = input;

    while !rest.is_empty() {
        if !rest.starts_with('<') {
            let end = rest.find('<').unwrap_or(rest.len());
            tokens.push(Token::Text(&rest[..end]));
            rest = &rest[end..];
            continue;
        }

        let terminator = if rest.starts_with("<!--") {
            "-->"
        } else if rest.starts_with("<![CDATA[") {
            "]]>"
        } else {
            ">"
        };
        let Some(pos) = rest[1..].find(terminator) else {
            tokens.push(Token::Text(rest));
            break;
        };
        let end = 1 + pos + terminator.len();
        tokens.push(classify(&rest[..end]));
        rest = &rest[end..];
    }

    tokens
}

fn classify(tag: &str) -> Token<'_> {
    if tag.starts_with("<![CDATA[") {
        Token::Text(tag)
    } else if tag.starts_with("</") {
        Token::Close(tag)
    } else if tag.starts_with("<!") || tag.starts_with("<?") {
        Token::Markup(tag)
    } else if tag.ends_with("/>") {
        Token::SelfClosing(tag)
    } else {
        Token::Open(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_markup() {
        let tokens = tokenize("<?xml version=\"1.0\"?><!DOCTYPE a><!-- x > y --><a/>");
        assert_eq!(
            tokens,
            vec![
                Token::Markup("<?xml version=\"1.0\"?>"),
                Token::Markup("<!DOCTYPE a>"),
                Token::Markup("<!-- x > y -->"),
                Token::SelfClosing("<a/>"),
            ]
        );
        assert!(tokens[2].is_comment());
        assert!(!tokens[1].is_comment());
    }

    #[test]
    fn single_letter_tags_are_tags() {
        assert_eq!(tokenize("<a>"), vec![Token::Open("<a>")]);
        assert_eq!(tokenize("</a>"), vec![Token::Close("</a>")]);
    }

    #[test]
    fn cdata_is_text() {
        let tokens = tokenize("<a><![CDATA[<b>]]></a>");
        assert_eq!(tokens[1], Token::Text("<![CDATA[<b>]]>"));
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn unterminated_tag_is_text() {
        assert_eq!(tokenize("x <oops"), vec![Token::Text("x "), Token::Text("<oops")]);
    }

    #[test]
    fn empty_input_has_no_tokens() {
        assert!(tokenize("").is_empty());
    }
}
