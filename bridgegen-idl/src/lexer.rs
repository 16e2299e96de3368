//! Tokenizer for declaration files.

use miette::SourceSpan;

use crate::error::{Result, SourceContext};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Ident(String),
    Str(String),
    Number(String),
    Punct(char),
    /// `=>`
    Arrow,
    /// `...`
    Ellipsis,
    Eof,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: SourceSpan,
}

impl Token {
    pub fn is_punct(&self, c: char) -> bool {
        self.kind == TokenKind::Punct(c)
    }

    pub fn is_ident(&self, name: &str) -> bool {
        matches!(&self.kind, TokenKind::Ident(ident) if ident == name)
    }

    pub fn describe(&self) -> String {
        match &self.kind {
            TokenKind::Ident(name) => format!("'{}'", name),
            TokenKind::Str(value) => format!("string \"{}\"", value),
            TokenKind::Number(value) => format!("number {}", value),
            TokenKind::Punct(c) => format!("'{}'", c),
            TokenKind::Arrow => "'=>'".to_string(),
            TokenKind::Ellipsis => "'...'".to_string(),
            TokenKind::Eof => "end of file".to_string(),
        }
    }
}

const PUNCTUATION: &[char] = &[
    '{', '}', '(', ')', '[', ']', '<', '>', ':', ';', ',', '?', '|', '&', '=', '@', '.',
];

/// Split `ctx.src()` into tokens, dropping whitespace and comments.
///
/// The returned vector always ends with an [`TokenKind::Eof`] token.
pub fn tokenize(ctx: &SourceContext) -> Result<Vec<Token>> {
    let src = ctx.src();
    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let c = bytes[pos];

        if c.is_ascii_whitespace() {
            pos += 1;
            continue;
        }

        if src[pos..].starts_with("//") {
            pos = src[pos..].find('\n').map_or(bytes.len(), |n| pos + n);
            continue;
        }

        if src[pos..].starts_with("/*") {
            match src[pos + 2..].find("*/") {
                Some(end) => pos += end + 4,
                None => {
                    return Err(ctx.syntax_error("unterminated comment", (pos, 2).into()));
                }
            }
            continue;
        }

        let start = pos;

        if c.is_ascii_alphabetic() || c == b'_' || c == b'$' {
            while pos < bytes.len()
                && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_' || bytes[pos] == b'$')
            {
                pos += 1;
            }
            tokens.push(Token {
                kind: TokenKind::Ident(src[start..pos].to_string()),
                span: (start, pos - start).into(),
            });
            continue;
        }

        if c.is_ascii_digit() {
            while pos < bytes.len() && (bytes[pos].is_ascii_digit() || bytes[pos] == b'.') {
                pos += 1;
            }
            tokens.push(Token {
                kind: TokenKind::Number(src[start..pos].to_string()),
                span: (start, pos - start).into(),
            });
            continue;
        }

        if c == b'"' || c == b'\'' {
            pos += 1;
            while pos < bytes.len() && bytes[pos] != c {
                if bytes[pos] == b'\n' {
                    break;
                }
                pos += 1;
            }
            if pos >= bytes.len() || bytes[pos] != c {
                return Err(ctx.syntax_error("unterminated string literal", (start, 1).into()));
            }
            pos += 1;
            tokens.push(Token {
                kind: TokenKind::Str(src[start + 1..pos - 1].to_string()),
                span: (start, pos - start).into(),
            });
            continue;
        }

        if src[pos..].starts_with("=>") {
            pos += 2;
            tokens.push(Token {
                kind: TokenKind::Arrow,
                span: (start, 2).into(),
            });
            continue;
        }

        if src[pos..].starts_with("...") {
            pos += 3;
            tokens.push(Token {
                kind: TokenKind::Ellipsis,
                span: (start, 3).into(),
            });
            continue;
        }

        let ch = src[pos..].chars().next().unwrap_or_default();
        if PUNCTUATION.contains(&ch) {
            pos += 1;
            tokens.push(Token {
                kind: TokenKind::Punct(ch),
                span: (start, 1).into(),
            });
            continue;
        }

        return Err(ctx.syntax_error(
            format!("unexpected character '{}'", ch),
            (start, ch.len_utf8()).into(),
        ));
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        span: (bytes.len(), 0).into(),
    });
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let ctx = SourceContext::new(src, "test.d.ts");
        tokenize(&ctx)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_skips_comments() {
        let tokens = kinds("// line\n/* block\n */ readonly");
        assert_eq!(
            tokens,
            vec![TokenKind::Ident("readonly".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn test_arrow_and_ellipsis() {
        let tokens = kinds("(...args) => void");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Punct('('),
                TokenKind::Ellipsis,
                TokenKind::Ident("args".into()),
                TokenKind::Punct(')'),
                TokenKind::Arrow,
                TokenKind::Ident("void".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_string_literal() {
        let tokens = kinds("ImplementedAs<void, 'click_impl'>");
        assert!(tokens.contains(&TokenKind::Str("click_impl".into())));
    }

    #[test]
    fn test_spans_point_at_source() {
        let ctx = SourceContext::new("  name", "test.d.ts");
        let tokens = tokenize(&ctx).unwrap();
        assert_eq!(tokens[0].span.offset(), 2);
        assert_eq!(tokens[0].span.len(), 4);
    }

    #[test]
    fn test_unexpected_character() {
        let ctx = SourceContext::new("interface A { # }", "test.d.ts");
        assert!(tokenize(&ctx).is_err());
    }

    #[test]
    fn test_unterminated_comment() {
        let ctx = SourceContext::new("/* open", "test.d.ts");
        assert!(tokenize(&ctx).is_err());
    }
}
