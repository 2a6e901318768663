//! Lexer for rich-text fragments using logos
//!
//! Fragments come from an editable surface, so the lexer never fails:
//! anything that is not a recognizable tag or comment is text.

use logos::Logos;

/// Token types for fragment markup
#[derive(Logos, Debug, Clone, PartialEq, Eq)]
pub enum Token<'src> {
    #[token("<!--", lex_comment)]
    Comment(&'src str),

    #[regex(r#"<[a-zA-Z][a-zA-Z0-9-]*([^>"']|"[^"]*"|'[^']*')*>"#, |lex| lex.slice())]
    OpenTag(&'src str),

    #[regex(r"</[a-zA-Z][a-zA-Z0-9-]*[ \t\r\n]*>", |lex| lex.slice())]
    CloseTag(&'src str),

    #[regex(r"[^<]+", |lex| lex.slice())]
    Text(&'src str),

    // A `<` that does not start a tag
    #[token("<")]
    Lt,
}

fn lex_comment<'src>(lex: &mut logos::Lexer<'src, Token<'src>>) -> &'src str {
    let rest = lex.remainder();
    let end = rest.find("-->").map(|i| i + 3).unwrap_or(rest.len());
    lex.bump(end);
    lex.slice()
}

/// Span information for a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSpan {
    pub start: usize,
    pub end: usize,
}

/// A token with its span
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken<'src> {
    pub token: Token<'src>,
    pub span: TokenSpan,
}

/// Lex markup into tokens with spans.
///
/// Unrecognized input degrades to [`Token::Text`] over the offending slice.
pub fn lex(source: &str) -> impl Iterator<Item = SpannedToken<'_>> + '_ {
    Token::lexer(source).spanned().map(move |(result, span)| {
        let token = result.unwrap_or(Token::Text(&source[span.clone()]));
        SpannedToken {
            token,
            span: TokenSpan {
                start: span.start,
                end: span.end,
            },
        }
    })
}

/// Tag name of an open or close tag slice, lowercased
pub fn tag_name(slice: &str) -> String {
    slice
        .trim_start_matches("</")
        .trim_start_matches('<')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect::<String>()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token<'_>> {
        lex(source).map(|t| t.token).collect()
    }

    #[test]
    fn test_lex_tags_and_text() {
        let toks = tokens("<p>Hello <b>world</b></p>");
        assert_eq!(
            toks,
            vec![
                Token::OpenTag("<p>"),
                Token::Text("Hello "),
                Token::OpenTag("<b>"),
                Token::Text("world"),
                Token::CloseTag("</b>"),
                Token::CloseTag("</p>"),
            ]
        );
    }

    #[test]
    fn test_lex_quoted_attribute_with_angle_bracket() {
        let toks = tokens(r#"<span title="a>b">x</span>"#);
        assert_eq!(toks[0], Token::OpenTag(r#"<span title="a>b">"#));
        assert_eq!(toks[1], Token::Text("x"));
    }

    #[test]
    fn test_lex_stray_less_than() {
        let toks = tokens("1 < 2");
        assert_eq!(toks, vec![Token::Text("1 "), Token::Lt, Token::Text(" 2")]);
    }

    #[test]
    fn test_lex_comment() {
        let toks = tokens("a<!-- note -->b");
        assert_eq!(
            toks,
            vec![Token::Text("a"), Token::Comment("<!-- note -->"), Token::Text("b")]
        );
    }

    #[test]
    fn test_lex_variable_token_is_text() {
        let toks = tokens("Dear {{ $nama }}");
        assert_eq!(toks, vec![Token::Text("Dear {{ $nama }}")]);
    }

    #[test]
    fn test_tag_name() {
        assert_eq!(tag_name("<SPAN style=\"x\">"), "span");
        assert_eq!(tag_name("</p >"), "p");
        assert_eq!(tag_name("<br/>"), "br");
    }
}
