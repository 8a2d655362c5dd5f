//! Recursive-descent parser for selector strings.
//!
//! ```text
//! expr  := exc
//! exc   := or (("exc" | "except") or)*
//! or    := and ("or" and)*
//! and   := not ("and" not)*
//! not   := "not" not | atom
//! atom  := "(" expr ")" | "%" TYPE | [op] dir
//! dir   := AXIS | "(" num "," num "," num ")" | VIEW
//! op    := "+" | "-" | "|" | "#" | ">" | "<"
//! ```
//!
//! Keywords are case-insensitive. A direction without an operator selects
//! parallel entities. A `(` opens a vector only when an optionally signed
//! number follows it, so `(-Z or +Z)` groups two atoms.

use chisel_math::Vector;
use tracing::trace;

use crate::combinators::{And, Inverse, Subtract, Sum};
use crate::error::SelectorError;
use crate::lexer::{Lexer, SpannedToken, Token};
use crate::predicates::{DirectionMinMax, DirectionSelector, ParallelDir, PerpendicularDir, TypeSelector};
use crate::selector::{Selector, DEFAULT_TOLERANCE};

// =============================================================================
// AST
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum DirOp {
    Parallel,
    Direction,
    Perpendicular,
    Max,
    Min,
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Type(String),
    Dir(DirOp, Vector),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Exc(Box<Expr>, Box<Expr>),
}

impl Expr {
    fn into_selector(self, tol: f64) -> Box<dyn Selector> {
        match self {
            Expr::Type(name) => Box::new(TypeSelector::new(name)),
            Expr::Dir(op, v) => match op {
                DirOp::Parallel => Box::new(ParallelDir::with_tolerance(v, tol)),
                DirOp::Direction => Box::new(DirectionSelector::with_tolerance(v, tol)),
                DirOp::Perpendicular => Box::new(PerpendicularDir::with_tolerance(v, tol)),
                DirOp::Max => Box::new(DirectionMinMax::max(v)),
                DirOp::Min => Box::new(DirectionMinMax::min(v)),
            },
            Expr::Not(e) => Box::new(Inverse::new(e.into_selector(tol))),
            Expr::And(a, b) => Box::new(And::new(a.into_selector(tol), b.into_selector(tol))),
            Expr::Or(a, b) => Box::new(Sum::new(a.into_selector(tol), b.into_selector(tol))),
            Expr::Exc(a, b) => Box::new(Subtract::new(a.into_selector(tol), b.into_selector(tol))),
        }
    }
}

fn axis(name: &str) -> Option<Vector> {
    let v = match name.to_ascii_uppercase().as_str() {
        "X" => Vector::new(1.0, 0.0, 0.0),
        "Y" => Vector::new(0.0, 1.0, 0.0),
        "Z" => Vector::new(0.0, 0.0, 1.0),
        "XY" => Vector::new(1.0, 1.0, 0.0),
        "YZ" => Vector::new(0.0, 1.0, 1.0),
        "XZ" => Vector::new(1.0, 0.0, 1.0),
        _ => return None,
    };
    Some(v)
}

fn named_view(name: &str) -> Option<(DirOp, Vector)> {
    let view = match name.to_ascii_lowercase().as_str() {
        "front" => (DirOp::Max, Vector::z_axis()),
        "back" => (DirOp::Min, Vector::z_axis()),
        "left" => (DirOp::Min, Vector::x_axis()),
        "right" => (DirOp::Max, Vector::x_axis()),
        "top" => (DirOp::Max, Vector::y_axis()),
        "bottom" => (DirOp::Min, Vector::y_axis()),
        _ => return None,
    };
    Some(view)
}

// =============================================================================
// Parser
// =============================================================================

struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
    end: usize,
}

impl Parser {
    fn new(text: &str) -> Result<Self, SelectorError> {
        Ok(Self {
            tokens: Lexer::new(text).tokenize()?,
            pos: 0,
            end: text.len(),
        })
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.end, |t| t.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).map(|t| t.token.clone());
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn eat_keyword(&mut self, words: &[&str]) -> bool {
        match self.peek() {
            Some(Token::Word(w)) if words.iter().any(|k| w.eq_ignore_ascii_case(k)) => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    fn expect(&mut self, expected: Token, what: &str) -> Result<(), SelectorError> {
        let at = self.offset();
        match self.advance() {
            Some(t) if t == expected => Ok(()),
            Some(t) => Err(SelectorError::parser(at, format!("expected {what}, got {t:?}"))),
            None => Err(SelectorError::parser(at, format!("expected {what}, got end of input"))),
        }
    }

    fn parse(mut self) -> Result<Expr, SelectorError> {
        if self.tokens.is_empty() {
            return Err(SelectorError::parser(0, "empty selector"));
        }
        let expr = self.parse_exc()?;
        if let Some(t) = self.peek() {
            return Err(SelectorError::parser(self.offset(), format!("unexpected token {t:?}")));
        }
        Ok(expr)
    }

    fn parse_exc(&mut self) -> Result<Expr, SelectorError> {
        let mut left = self.parse_or()?;
        while self.eat_keyword(&["exc", "except"]) {
            let right = self.parse_or()?;
            left = Expr::Exc(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> Result<Expr, SelectorError> {
        let mut left = self.parse_and()?;
        while self.eat_keyword(&["or"]) {
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, SelectorError> {
        let mut left = self.parse_not()?;
        while self.eat_keyword(&["and"]) {
            let right = self.parse_not()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr, SelectorError> {
        if self.eat_keyword(&["not"]) {
            return Ok(Expr::Not(Box::new(self.parse_not()?)));
        }
        self.parse_atom()
    }

    fn parse_atom(&mut self) -> Result<Expr, SelectorError> {
        let at = self.offset();
        let op = match self.peek() {
            Some(Token::LParen) => {
                if self.vector_literal_ahead() {
                    return Ok(Expr::Dir(DirOp::Parallel, self.parse_vector()?));
                }
                self.pos += 1;
                let inner = self.parse_exc()?;
                self.expect(Token::RParen, "')'")?;
                return Ok(inner);
            }
            Some(Token::Percent) => {
                self.pos += 1;
                return match self.advance() {
                    Some(Token::Word(name)) => Ok(Expr::Type(name)),
                    _ => Err(SelectorError::parser(at + 1, "expected a type name after '%'")),
                };
            }
            Some(Token::Word(_)) => None,
            Some(Token::Plus) => Some((DirOp::Direction, false)),
            Some(Token::Minus) => Some((DirOp::Direction, true)),
            Some(Token::Pipe) => Some((DirOp::Parallel, false)),
            Some(Token::Hash) => Some((DirOp::Perpendicular, false)),
            Some(Token::Greater) => Some((DirOp::Max, false)),
            Some(Token::Less) => Some((DirOp::Min, false)),
            Some(t) => return Err(SelectorError::parser(at, format!("unexpected token {t:?}"))),
            None => return Err(SelectorError::parser(at, "unexpected end of input")),
        };
        if op.is_some() {
            self.pos += 1;
        }
        self.parse_dir(op)
    }

    /// `(` followed by an optionally signed number opens a vector literal;
    /// anything else opens a parenthesized expression.
    fn vector_literal_ahead(&self) -> bool {
        let token = |k: usize| self.tokens.get(self.pos + k).map(|t| &t.token);
        match token(1) {
            Some(Token::Number(_)) => true,
            Some(Token::Minus | Token::Plus) => matches!(token(2), Some(Token::Number(_))),
            _ => false,
        }
    }

    fn parse_dir(&mut self, op: Option<(DirOp, bool)>) -> Result<Expr, SelectorError> {
        let at = self.offset();
        let v = match self.peek() {
            Some(Token::LParen) => self.parse_vector()?,
            Some(Token::Word(w)) => {
                let w = w.clone();
                if let Some((view_op, v)) = named_view(&w) {
                    if op.is_some() {
                        return Err(SelectorError::parser(
                            at,
                            format!("named view '{w}' cannot take a direction operator"),
                        ));
                    }
                    self.pos += 1;
                    return Ok(Expr::Dir(view_op, v));
                }
                let v = axis(&w).ok_or(SelectorError::UnknownAxis(w))?;
                self.pos += 1;
                v
            }
            _ => return Err(SelectorError::parser(at, "expected an axis, vector or view name")),
        };
        Ok(match op {
            None => Expr::Dir(DirOp::Parallel, v),
            Some((dir_op, negate)) => Expr::Dir(dir_op, if negate { -v } else { v }),
        })
    }

    fn parse_vector(&mut self) -> Result<Vector, SelectorError> {
        self.expect(Token::LParen, "'('")?;
        let x = self.parse_number()?;
        self.expect(Token::Comma, "','")?;
        let y = self.parse_number()?;
        self.expect(Token::Comma, "','")?;
        let z = self.parse_number()?;
        self.expect(Token::RParen, "')'")?;
        Ok(Vector::new(x, y, z))
    }

    fn parse_number(&mut self) -> Result<f64, SelectorError> {
        let sign = match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                -1.0
            }
            Some(Token::Plus) => {
                self.pos += 1;
                1.0
            }
            _ => 1.0,
        };
        let at = self.offset();
        match self.advance() {
            Some(Token::Number(n)) => Ok(sign * n),
            _ => Err(SelectorError::parser(at, "expected a number")),
        }
    }
}

// =============================================================================
// StringSyntax
// =============================================================================

/// A selector parsed from text such as `">Z"`, `"|X and %LINE"` or
/// `"not (>Z or <Z)"`.
#[derive(Debug)]
pub struct StringSyntax {
    text: String,
    inner: Box<dyn Selector>,
}

impl StringSyntax {
    /// Parse `text` with the default tolerance.
    pub fn new(text: &str) -> Result<Self, SelectorError> {
        Self::with_tolerance(text, DEFAULT_TOLERANCE)
    }

    /// Parse `text`; directional selectors use `tolerance`.
    pub fn with_tolerance(text: &str, tolerance: f64) -> Result<Self, SelectorError> {
        let expr = Parser::new(text)?.parse()?;
        trace!(text, ?expr, "parsed selector");
        Ok(Self {
            text: text.to_string(),
            inner: expr.into_selector(tolerance),
        })
    }

    /// The source text.
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Selector for StringSyntax {
    fn filter(&self, objects: &[chisel_topo::Shape]) -> Vec<chisel_topo::Shape> {
        self.inner.filter(objects)
    }
}
