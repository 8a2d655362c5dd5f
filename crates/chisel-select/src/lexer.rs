//! Selector string lexer.
//!
//! Tokens:
//! - words (axes, named views, type names, keywords such as `and`)
//! - unsigned numbers (`1`, `0.5`, `2e-3`)
//! - direction operators `+ - | # > <`
//! - punctuation `( ) , %`

use crate::error::SelectorError;

/// A token of selector text.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    /// Identifier or keyword.
    Word(String),
    /// Unsigned number.
    Number(f64),
    /// `(`.
    LParen,
    /// `)`.
    RParen,
    /// `,`.
    Comma,
    /// `%`, introducing a type name.
    Percent,
    /// `+`.
    Plus,
    /// `-`.
    Minus,
    /// `|`.
    Pipe,
    /// `#`.
    Hash,
    /// `>`.
    Greater,
    /// `<`.
    Less,
}

/// A token with the byte offset where it starts.
#[derive(Debug, Clone)]
pub(crate) struct SpannedToken {
    pub(crate) token: Token,
    pub(crate) pos: usize,
}

pub(crate) struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            pos: 0,
        }
    }

    /// Tokenize the entire input.
    pub(crate) fn tokenize(&mut self) -> Result<Vec<SpannedToken>, SelectorError> {
        let mut tokens = Vec::new();
        while let Some(tok) = self.next_token()? {
            tokens.push(tok);
        }
        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Option<SpannedToken>, SelectorError> {
        while self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            self.pos += 1;
        }
        let start = self.pos;
        let ch = match self.peek() {
            Some(c) => c,
            None => return Ok(None),
        };

        let single = match ch {
            b'(' => Some(Token::LParen),
            b')' => Some(Token::RParen),
            b',' => Some(Token::Comma),
            b'%' => Some(Token::Percent),
            b'+' => Some(Token::Plus),
            b'-' => Some(Token::Minus),
            b'|' => Some(Token::Pipe),
            b'#' => Some(Token::Hash),
            b'>' => Some(Token::Greater),
            b'<' => Some(Token::Less),
            _ => None,
        };
        let token = match single {
            Some(t) => {
                self.pos += 1;
                t
            }
            None if ch.is_ascii_digit() || ch == b'.' => self.read_number()?,
            None if ch.is_ascii_alphabetic() || ch == b'_' => self.read_word(),
            None => {
                return Err(SelectorError::lexer(
                    start,
                    format!("unexpected character: '{}'", ch as char),
                ))
            }
        };
        Ok(Some(SpannedToken { token, pos: start }))
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn read_word(&mut self) -> Token {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == b'_')
        {
            self.pos += 1;
        }
        Token::Word(String::from_utf8_lossy(&self.input[start..self.pos]).into_owned())
    }

    fn read_number(&mut self) -> Result<Token, SelectorError> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit() || c == b'.') {
            self.pos += 1;
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            let save = self.pos;
            self.pos += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.pos += 1;
                }
            } else {
                self.pos = save;
            }
        }
        let text = String::from_utf8_lossy(&self.input[start..self.pos]);
        text.parse::<f64>()
            .map(Token::Number)
            .map_err(|_| SelectorError::lexer(start, format!("invalid number: {text}")))
    }
}
