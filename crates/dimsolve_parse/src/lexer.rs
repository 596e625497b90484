//! Byte-position-tracked lexer for the source grammar of §3.1.
//!
//! Structurally a single-stage cousin of the teacher's two-stage
//! `LineLexer`/`Lexer` split (`crates/logicaffeine_language/src/lexer.rs`):
//! this grammar has no indentation-sensitive blocks, so one pass that walks
//! bytes and tracks line/column as it goes is the whole lexer. `tokenize`
//! eagerly produces the full `Vec<Token>`, matching the teacher's own
//! `Lexer::tokenize` shape rather than a streaming `Iterator`.
//!
//! Source text is treated byte-at-a-time: identifiers, keywords, and
//! numbers are all ASCII in this grammar, so indexing `bytes` and casting
//! to `char` never splits a multi-byte sequence.

use std::rc::Rc;

use dimsolve_base::{ErrorKind, Interner, Loc, LocatedError};

use crate::token::{Token, TokenKind};

pub struct Lexer<'a> {
    file: Rc<str>,
    bytes: &'a [u8],
    pos: usize,
    line: u32,
    col: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, file: impl Into<Rc<str>>) -> Self {
        Lexer {
            file: file.into(),
            bytes: source.as_bytes(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    /// Tokenizes the whole source, interning identifiers as it goes.
    ///
    /// Stops at the first lexical error — unlike the statement-level parser,
    /// which keeps going after a bad statement to report more than one
    /// diagnostic, a stray byte the lexer can't classify poisons everything
    /// after it, so there is nothing useful left to recover into.
    pub fn tokenize(mut self, interner: &mut Interner) -> Result<Vec<Token>, LocatedError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia();
            let (start_line, start_col) = (self.line, self.col);

            let Some(c) = self.peek() else {
                tokens.push(Token::new(TokenKind::Eof, self.point(start_line, start_col)));
                break;
            };

            let kind = match c {
                '+' => {
                    self.advance();
                    TokenKind::Plus
                }
                '-' => {
                    self.advance();
                    TokenKind::Minus
                }
                '*' => {
                    self.advance();
                    TokenKind::Star
                }
                '/' => {
                    self.advance();
                    TokenKind::Slash
                }
                '^' => {
                    self.advance();
                    TokenKind::Caret
                }
                '(' => {
                    self.advance();
                    TokenKind::LParen
                }
                ')' => {
                    self.advance();
                    TokenKind::RParen
                }
                '[' => {
                    self.advance();
                    TokenKind::LBracket
                }
                ']' => {
                    self.advance();
                    TokenKind::RBracket
                }
                ';' => {
                    self.advance();
                    TokenKind::Semicolon
                }
                ':' => {
                    self.advance();
                    TokenKind::Colon
                }
                '=' => {
                    self.advance();
                    if self.peek() == Some('=') {
                        self.advance();
                        TokenKind::EqEq
                    } else {
                        TokenKind::Equal
                    }
                }
                c if c.is_ascii_digit() => self.lex_number(),
                c if c.is_ascii_alphabetic() || c == '_' => self.lex_ident(interner),
                other => {
                    return Err(LocatedError::of_kind(
                        ErrorKind::Parse,
                        format!("unexpected character '{}'", other),
                        self.point(start_line, start_col),
                    ));
                }
            };

            let end_col = self.col.saturating_sub(1).max(start_col);
            tokens.push(Token::new(kind, Loc::new(self.file.clone(), start_line, start_col, start_line, end_col)));
        }
        Ok(tokens)
    }

    fn point(&self, line: u32, col: u32) -> Loc {
        Loc::point(self.file.clone(), line, col)
    }

    fn peek(&self) -> Option<char> {
        self.bytes.get(self.pos).map(|&b| b as char)
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.bytes.get(self.pos + offset).map(|&b| b as char)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('/') if self.peek_at(1) == Some('/') => {
                    while !matches!(self.peek(), None | Some('\n')) {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn lex_number(&mut self) -> TokenKind {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }
        if self.peek() == Some('.') && matches!(self.peek_at(1), Some(c) if c.is_ascii_digit()) {
            self.advance();
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
        }
        let text = std::str::from_utf8(&self.bytes[start..self.pos]).expect("ascii digits are valid utf8");
        TokenKind::Number(text.parse().expect("lexed digits always parse"))
    }

    fn lex_ident(&mut self, interner: &mut Interner) -> TokenKind {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            self.advance();
        }
        let text = std::str::from_utf8(&self.bytes[start..self.pos]).expect("ascii identifier chars are valid utf8");
        match text {
            "unit" => TokenKind::KwUnit,
            "define" => TokenKind::KwDefine,
            "spec" => TokenKind::KwSpec,
            _ => TokenKind::Ident(interner.intern(text)),
        }
    }
}
