//! The lexer: a byte cursor over one source buffer.

use crate::error::{LithError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Token `(`.
    LParen,
    /// Token `)`.
    RParen,
    /// Token `'`.
    Quote,
    /// Token `` ` `` or `@`.
    Quasiquote,
    /// Token `,`.
    Unquote,
    /// Token `,@`.
    UnquoteSplicing,
    /// A lone `.`; only meaningful inside a list.
    Dot,
    /// String literal with escapes already decoded.
    Str(Vec<u8>),
    /// Any other token; the reader classifies it as boolean, number or
    /// symbol.
    Atom(String),
}

const STRING_EOF: &str = "while reading a string literal";

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Cursor into one source buffer. The cursor only moves forward; the
/// driver keeps the lexer alive across top-level forms so reading resumes
/// where the previous form ended.
pub struct Lexer<'a> {
    src: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Lexer<'a> {
        Lexer {
            src: source.as_bytes(),
            pos: 0,
        }
    }

    /// Skip whitespace and `;` line comments. Comments are consumed for
    /// good even when the following token is only peeked.
    fn skip_blank(&mut self) {
        while let Some(&b) = self.src.get(self.pos) {
            match b {
                b' ' | b'\t' | b'\n' => self.pos += 1,
                b';' => {
                    while let Some(&b) = self.src.get(self.pos) {
                        if b == b'\n' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
    }

    fn scan_string(&self, mut pos: usize) -> Result<(usize, Token)> {
        let mut buf = Vec::new();
        loop {
            let b = *self
                .src
                .get(pos)
                .ok_or_else(|| LithError::unexpected_eof(STRING_EOF))?;
            pos += 1;
            match b {
                b'"' => return Ok((pos, Token::Str(buf))),
                b'\\' => {
                    let esc = *self
                        .src
                        .get(pos)
                        .ok_or_else(|| LithError::unexpected_eof(STRING_EOF))?;
                    pos += 1;
                    match esc {
                        b'n' => buf.push(b'\n'),
                        b'r' => buf.push(b'\r'),
                        b't' => buf.push(b'\t'),
                        b'0' => buf.push(0),
                        b'x' => {
                            let pair = self
                                .src
                                .get(pos)
                                .copied()
                                .and_then(hex_digit)
                                .zip(self.src.get(pos + 1).copied().and_then(hex_digit));
                            match pair {
                                Some((hi, lo)) => {
                                    buf.push(hi * 16 + lo);
                                    pos += 2;
                                }
                                None => {
                                    return Err(LithError::syntax(
                                        "Invalid character escape literal, \
                                         expecting two hexadecimal characters",
                                    ));
                                }
                            }
                        }
                        other => buf.push(other),
                    }
                }
                other => buf.push(other),
            }
        }
    }

    /// Scan the token starting at `pos`; returns the position just past
    /// it. Does not move the cursor.
    fn scan_token(&self, pos: usize) -> Result<(usize, Token)> {
        let Some(&b) = self.src.get(pos) else {
            return Err(LithError::eof());
        };
        match b {
            b'(' => Ok((pos + 1, Token::LParen)),
            b')' => Ok((pos + 1, Token::RParen)),
            b'\'' => Ok((pos + 1, Token::Quote)),
            b'`' | b'@' => Ok((pos + 1, Token::Quasiquote)),
            b',' => {
                if self.src.get(pos + 1) == Some(&b'@') {
                    Ok((pos + 2, Token::UnquoteSplicing))
                } else {
                    Ok((pos + 1, Token::Unquote))
                }
            }
            b'"' => self.scan_string(pos + 1),
            _ => {
                let mut end = pos;
                while let Some(&b) = self.src.get(end) {
                    if matches!(b, b' ' | b'\t' | b'\n' | b';' | b'(' | b')') {
                        break;
                    }
                    end += 1;
                }
                let text = String::from_utf8_lossy(&self.src[pos..end]).into_owned();
                if text == "." {
                    Ok((end, Token::Dot))
                } else {
                    Ok((end, Token::Atom(text)))
                }
            }
        }
    }

    /// Look at the next token without consuming it.
    pub fn peek(&mut self) -> Result<Token> {
        self.skip_blank();
        self.scan_token(self.pos).map(|(_, token)| token)
    }

    /// Consume and return the next token. End of input is the benign
    /// `Eof` error unless it cuts a token short.
    pub fn try_next(&mut self) -> Result<Token> {
        self.skip_blank();
        let (next, token) = self.scan_token(self.pos)?;
        self.pos = next;
        Ok(token)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        match self.try_next() {
            Ok(token) => Some(token),
            Err(e) if e.is_benign_eof() => None,
            Err(e) => panic!("lexer error: {e}"),
        }
    }
}
