use crate::ParseError;
use enumcov_types::span::Span;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Tok {
    Ident(String),
    Number(i64),
    Str(String),
    Punct(char),
    /// `=>`
    Arrow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub tok: Tok,
    pub span: Span,
}

impl Token {
    pub fn is_punct(&self, c: char) -> bool {
        self.tok == Tok::Punct(c)
    }

    pub fn is_ident(&self, word: &str) -> bool {
        matches!(&self.tok, Tok::Ident(s) if s == word)
    }

    pub fn ident(&self) -> Option<&str> {
        match &self.tok {
            Tok::Ident(s) => Some(s),
            _ => None,
        }
    }
}

const PUNCT: &str = "{}[]()<>,;=.?:!+-*/&|%";

pub(crate) fn lex(path: &str, text: &str) -> Result<Vec<Token>, ParseError> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if b.is_ascii_whitespace() {
            i += 1;
            continue;
        }
        if text[i..].starts_with("//") {
            i = text[i..].find('\n').map_or(bytes.len(), |n| i + n);
            continue;
        }
        if text[i..].starts_with("/*") {
            i = text[i + 2..]
                .find("*/")
                .map_or(bytes.len(), |n| i + 2 + n + 2);
            continue;
        }

        let start = i;
        if b.is_ascii_alphabetic() || b == b'_' || b == b'@' {
            i += 1;
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                i += 1;
            }
            tokens.push(Token {
                tok: Tok::Ident(text[start..i].trim_start_matches('@').to_string()),
                span: Span::new(start, i),
            });
        } else if b.is_ascii_digit() {
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            let value = text[start..i]
                .parse::<i64>()
                .map_err(|e| ParseError::new(path, start, format!("bad number: {e}")))?;
            // Integer suffixes (`u`, `L`, ...) carry no meaning here.
            while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
                i += 1;
            }
            tokens.push(Token {
                tok: Tok::Number(value),
                span: Span::new(start, i),
            });
        } else if b == b'"' {
            i += 1;
            let mut value = String::new();
            loop {
                let Some(c) = text[i..].chars().next() else {
                    return Err(ParseError::new(path, start, "unterminated string literal"));
                };
                i += c.len_utf8();
                match c {
                    '"' => break,
                    '\\' => {
                        let Some(escaped) = text[i..].chars().next() else {
                            return Err(ParseError::new(path, start, "unterminated string literal"));
                        };
                        i += escaped.len_utf8();
                        value.push(match escaped {
                            'n' => '\n',
                            't' => '\t',
                            other => other,
                        });
                    }
                    other => value.push(other),
                }
            }
            tokens.push(Token {
                tok: Tok::Str(value),
                span: Span::new(start, i),
            });
        } else if text[i..].starts_with("=>") {
            i += 2;
            tokens.push(Token {
                tok: Tok::Arrow,
                span: Span::new(start, i),
            });
        } else if PUNCT.as_bytes().contains(&b) {
            i += 1;
            tokens.push(Token {
                tok: Tok::Punct(b as char),
                span: Span::new(start, i),
            });
        } else {
            let c = text[i..].chars().next().unwrap_or('?');
            return Err(ParseError::new(
                path,
                start,
                format!("unexpected character {c:?}"),
            ));
        }
    }

    Ok(tokens)
}
