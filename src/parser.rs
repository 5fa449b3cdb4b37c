//! Arithmetic expression parser for the rotation angle argument.
//!
//! Grammar:
//!
//! ```text
//! expr    = mul ("+" mul | "-" mul)*
//! mul     = unary ("*" unary | "/" unary)*
//! unary   = ("+" | "-")? primary
//! primary = num | "(" expr ")"
//! ```
//!
//! with `pi` as the only named constant. Tokens and nodes live in two
//! append-only arenas owned by the parse result; nodes refer to tokens and
//! to each other by index. Evaluation is a pure fold of the node tree into
//! a [`Real`]; decimal literals are lifted exactly as integer numerator over
//! a power of ten before the single rounding division.

use num_bigint::BigInt;
use thiserror::Error;

use crate::real::{real_from_bigint, Real, PI};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown character `{0}`")]
    UnknownToken(char),
    #[error("malformed number `{0}`")]
    MalformedNumber(String),
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("expected a number or a parenthesized expression, found `{0}`")]
    ExpectedPrimary(String),
    #[error("unclosed parenthesis")]
    UnclosedParenthesis,
    #[error("trailing input after the expression")]
    TrailingInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Reserved,
    Num,
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Add,
    Sub,
    Mul,
    Div,
    Num,
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    token: usize,
    lhs: Option<usize>,
    rhs: Option<usize>,
}

/// Parsed expression: token arena, node arena, root index.
#[derive(Debug)]
pub struct Ast {
    tokens: Vec<Token>,
    nodes: Vec<Node>,
    root: usize,
}

impl Ast {
    pub fn parse(s: &str) -> Result<Ast, ParseError> {
        let tokens = tokenize(s)?;
        let mut parser = Parser {
            tokens: &tokens,
            pos: 0,
            nodes: Vec::with_capacity(tokens.len()),
        };
        let root = parser.expr()?;
        if parser.pos != parser.tokens.len() {
            return Err(ParseError::TrailingInput);
        }
        Ok(Ast {
            nodes: parser.nodes,
            tokens,
            root,
        })
    }

    /// Evaluate to a [`Real`]; total on any successfully parsed tree.
    pub fn value(&self) -> Real {
        self.eval(self.root)
    }

    fn eval(&self, idx: usize) -> Real {
        let node = &self.nodes[idx];
        match node.kind {
            NodeKind::Add => self.eval(node.lhs.unwrap()) + self.eval(node.rhs.unwrap()),
            NodeKind::Sub => match node.rhs {
                // Unary minus is a Sub node without a right child.
                None => -self.eval(node.lhs.unwrap()),
                Some(rhs) => self.eval(node.lhs.unwrap()) - self.eval(rhs),
            },
            NodeKind::Mul => self.eval(node.lhs.unwrap()) * self.eval(node.rhs.unwrap()),
            NodeKind::Div => self.eval(node.lhs.unwrap()) / self.eval(node.rhs.unwrap()),
            NodeKind::Num => {
                let text = &self.tokens[node.token].text;
                if text == "pi" {
                    PI.clone()
                } else {
                    decimal_value(text)
                }
            }
        }
    }
}

/// Exact decimal-to-real conversion: digits become an integer numerator, the
/// fractional length a power-of-ten denominator.
fn decimal_value(text: &str) -> Real {
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, f),
        None => (text, ""),
    };
    let mut digits = String::with_capacity(int_part.len() + frac_part.len());
    digits.push_str(int_part);
    digits.push_str(frac_part);
    let num: BigInt = if digits.is_empty() {
        BigInt::from(0)
    } else {
        digits.parse().expect("token contains only digits")
    };
    let den = BigInt::from(10).pow(frac_part.len() as u32);
    real_from_bigint(&num) / real_from_bigint(&den)
}

fn tokenize(s: &str) -> Result<Vec<Token>, ParseError> {
    let chars: Vec<char> = s.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\n' => {}
            '+' | '-' | '*' | '/' | '(' | ')' => tokens.push(Token {
                kind: TokenKind::Reserved,
                text: c.to_string(),
            }),
            'p' => {
                if chars.get(i + 1) == Some(&'i') {
                    tokens.push(Token {
                        kind: TokenKind::Num,
                        text: "pi".to_string(),
                    });
                    i += 1;
                } else {
                    return Err(ParseError::UnknownToken('p'));
                }
            }
            '0'..='9' => {
                let mut j = i;
                let mut dots = 0;
                while j < chars.len() && (chars[j].is_ascii_digit() || chars[j] == '.') {
                    if chars[j] == '.' {
                        dots += 1;
                    }
                    j += 1;
                }
                let text: String = chars[i..j].iter().collect();
                if dots > 1 {
                    return Err(ParseError::MalformedNumber(text));
                }
                tokens.push(Token {
                    kind: TokenKind::Num,
                    text,
                });
                i = j - 1;
            }
            _ => return Err(ParseError::UnknownToken(c)),
        }
        i += 1;
    }
    Ok(tokens)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    nodes: Vec<Node>,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn push(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn expr(&mut self) -> Result<usize, ParseError> {
        let mut node = self.mul()?;
        while let Some(token) = self.peek() {
            let kind = match token.text.as_str() {
                "+" => NodeKind::Add,
                "-" => NodeKind::Sub,
                _ => break,
            };
            let token_idx = self.pos;
            self.pos += 1;
            let rhs = self.mul()?;
            node = self.push(Node {
                kind,
                token: token_idx,
                lhs: Some(node),
                rhs: Some(rhs),
            });
        }
        Ok(node)
    }

    fn mul(&mut self) -> Result<usize, ParseError> {
        let mut node = self.unary()?;
        while let Some(token) = self.peek() {
            let kind = match token.text.as_str() {
                "*" => NodeKind::Mul,
                "/" => NodeKind::Div,
                _ => break,
            };
            let token_idx = self.pos;
            self.pos += 1;
            let rhs = self.unary()?;
            node = self.push(Node {
                kind,
                token: token_idx,
                lhs: Some(node),
                rhs: Some(rhs),
            });
        }
        Ok(node)
    }

    fn unary(&mut self) -> Result<usize, ParseError> {
        let token = self.peek().ok_or(ParseError::UnexpectedEnd)?;
        match token.text.as_str() {
            "+" => {
                self.pos += 1;
                self.primary()
            }
            "-" => {
                let token_idx = self.pos;
                self.pos += 1;
                let operand = self.primary()?;
                Ok(self.push(Node {
                    kind: NodeKind::Sub,
                    token: token_idx,
                    lhs: Some(operand),
                    rhs: None,
                }))
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<usize, ParseError> {
        let token = self.peek().ok_or(ParseError::UnexpectedEnd)?;
        if token.kind == TokenKind::Reserved && token.text == "(" {
            self.pos += 1;
            let node = self.expr()?;
            match self.peek() {
                Some(t) if t.text == ")" => self.pos += 1,
                _ => return Err(ParseError::UnclosedParenthesis),
            }
            return Ok(node);
        }
        if token.kind != TokenKind::Num {
            return Err(ParseError::ExpectedPrimary(token.text.clone()));
        }
        let token_idx = self.pos;
        self.pos += 1;
        Ok(self.push(Node {
            kind: NodeKind::Num,
            token: token_idx,
            lhs: None,
            rhs: None,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::real::to_f64;

    fn value(s: &str) -> f64 {
        to_f64(&Ast::parse(s).unwrap().value())
    }

    #[test]
    fn test_values() {
        let pi = std::f64::consts::PI;
        assert!((value("pi/128") - pi / 128.0).abs() < 1e-15);
        assert!((value("pi/256") - pi / 256.0).abs() < 1e-15);
        assert!((value("-pi/128") + pi / 128.0).abs() < 1e-15);
        assert_eq!(value("5+20-4"), 21.0);
        assert_eq!(value("12 + 34 - 5"), 41.0);
        assert_eq!(value("5+6*7"), 47.0);
        assert_eq!(value("(3+5)/2"), 4.0);
        assert_eq!(value("-10+20"), 10.0);
        assert_eq!(value("-1.28"), -1.28);
        assert_eq!(value("1.5"), 1.5);
    }

    #[test]
    fn test_errors() {
        assert!(Ast::parse("pi 10").is_err());
        assert!(Ast::parse("10 10").is_err());
        assert!(Ast::parse("(").is_err());
        assert!(Ast::parse("()").is_err());
        assert!(Ast::parse("((pi)").is_err());
        assert!(Ast::parse("(pi))").is_err());
        assert!(Ast::parse("- - 10").is_err());
        assert!(Ast::parse("1.2.3").is_err());
        assert!(Ast::parse("q").is_err());
        assert!(Ast::parse("p").is_err());
        assert!(Ast::parse("").is_err());
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(Ast::parse("(").unwrap_err(), ParseError::UnexpectedEnd);
        assert_eq!(
            Ast::parse("(pi))").unwrap_err(),
            ParseError::TrailingInput
        );
        assert_eq!(Ast::parse("q").unwrap_err(), ParseError::UnknownToken('q'));
        assert_eq!(
            Ast::parse("1.2.3").unwrap_err(),
            ParseError::MalformedNumber("1.2.3".to_string())
        );
    }
}
