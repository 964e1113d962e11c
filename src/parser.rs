//! Formula parser.
//!
//! Recursive descent over four precedence levels, lowest first:
//!
//! ```text
//! implication := or ( "→" or )*
//! or          := and ( "∨" and )*
//! and         := not ( "∧" not )*
//! not         := "¬" not | primary
//! primary     := "(" implication ")" | letter
//! ```
//!
//! All binary levels fold left, including implication: `a → b → c` is read as
//! `(a → b) → c`. Variables are single ASCII letters, so `ab` is two separate
//! tokens. Whitespace between tokens is ignored.
//!
//! ```
//! use taut_rs::parser::parse;
//!
//! let f = parse("¬(a ∧ ¬a)").unwrap();
//! assert_eq!(f.collect_variables(), vec!['a']);
//! assert!(parse("a b").is_err());
//! ```

use std::fmt;

use log::debug;
use thiserror::Error;

use crate::ast::Formula;

pub const NOT: &str = "¬";
pub const AND: &str = "∧";
pub const OR: &str = "∨";
pub const IMPLIES: &str = "→";

/// What the parser found at the position of an error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Found {
    Char(char),
    End,
}

impl fmt::Display for Found {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Found::Char(c) => write!(f, "'{}'", c),
            Found::End => f.write_str("end of input"),
        }
    }
}

/// Malformed formula text. Offsets are byte offsets into the input.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum SyntaxError {
    #[error("unexpected token {found} at offset {offset}")]
    UnexpectedToken { offset: usize, found: Found },

    #[error("expected ')' at offset {offset} to close '(' at offset {open}, found {found}")]
    UnclosedParen {
        open: usize,
        offset: usize,
        found: Found,
    },

    #[error("trailing characters at offset {offset}: {rest:?}")]
    TrailingInput { offset: usize, rest: String },
}

impl SyntaxError {
    /// Byte offset at which the error was detected.
    pub fn offset(&self) -> usize {
        match self {
            SyntaxError::UnexpectedToken { offset, .. }
            | SyntaxError::UnclosedParen { offset, .. }
            | SyntaxError::TrailingInput { offset, .. } => *offset,
        }
    }
}

/// Parses formula text into a tree.
pub fn parse(text: &str) -> Result<Formula, SyntaxError> {
    debug!("parse({:?})", text);
    Parser::new(text).parse()
}

/// Single-pass cursor over formula text.
#[derive(Debug)]
pub struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Parses the whole input as one formula.
    pub fn parse(&mut self) -> Result<Formula, SyntaxError> {
        self.pos = 0;
        let formula = self.parse_implication()?;
        self.skip_whitespace();
        if self.pos < self.input.len() {
            return Err(SyntaxError::TrailingInput {
                offset: self.pos,
                rest: self.input[self.pos..].to_string(),
            });
        }
        Ok(formula)
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.input[self.pos..];
        let trimmed = rest.trim_start_matches(|c| matches!(c, ' ' | '\t' | '\n' | '\r'));
        self.pos += rest.len() - trimmed.len();
    }

    fn peek(&mut self) -> Found {
        self.skip_whitespace();
        match self.input[self.pos..].chars().next() {
            Some(c) => Found::Char(c),
            None => Found::End,
        }
    }

    /// Consumes `op` if it is the next token.
    fn eat(&mut self, op: &str) -> bool {
        self.skip_whitespace();
        if self.input[self.pos..].starts_with(op) {
            self.pos += op.len();
            true
        } else {
            false
        }
    }

    fn parse_implication(&mut self) -> Result<Formula, SyntaxError> {
        let mut left = self.parse_or()?;
        while self.eat(IMPLIES) {
            let right = self.parse_or()?;
            left = Formula::implies(left, right);
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> Result<Formula, SyntaxError> {
        let mut left = self.parse_and()?;
        while self.eat(OR) {
            let right = self.parse_and()?;
            left = Formula::or(left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Formula, SyntaxError> {
        let mut left = self.parse_not()?;
        while self.eat(AND) {
            let right = self.parse_not()?;
            left = Formula::and(left, right);
        }
        Ok(left)
    }

    /// A run of `¬` is counted rather than recursed into.
    fn parse_not(&mut self) -> Result<Formula, SyntaxError> {
        let mut negations = 0usize;
        while self.eat(NOT) {
            negations += 1;
        }
        let mut formula = self.parse_primary()?;
        for _ in 0..negations {
            formula = Formula::not(formula);
        }
        Ok(formula)
    }

    fn parse_primary(&mut self) -> Result<Formula, SyntaxError> {
        match self.peek() {
            Found::Char('(') => {
                let open = self.pos;
                self.pos += 1;
                let inner = self.parse_implication()?;
                match self.peek() {
                    Found::Char(')') => {
                        self.pos += 1;
                        Ok(inner)
                    }
                    found => Err(SyntaxError::UnclosedParen {
                        open,
                        offset: self.pos,
                        found,
                    }),
                }
            }
            Found::Char(c) if c.is_ascii_alphabetic() => {
                self.pos += 1;
                Ok(Formula::var(c))
            }
            found => Err(SyntaxError::UnexpectedToken {
                offset: self.pos,
                found,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeKind;

    fn v(name: char) -> Formula {
        Formula::var(name)
    }

    #[test]
    fn test_parse_variable() {
        assert_eq!(parse("p").unwrap(), v('p'));
        assert_eq!(parse("  Q\t").unwrap(), v('Q'));
    }

    #[test]
    fn test_parse_connectives() {
        assert_eq!(parse("a ∧ b").unwrap(), Formula::and(v('a'), v('b')));
        assert_eq!(parse("a ∨ b").unwrap(), Formula::or(v('a'), v('b')));
        assert_eq!(parse("a → b").unwrap(), Formula::implies(v('a'), v('b')));
        assert_eq!(parse("¬a").unwrap(), Formula::not(v('a')));
    }

    #[test]
    fn test_parse_without_spaces() {
        assert_eq!(parse("a∧¬b").unwrap(), Formula::and(v('a'), Formula::not(v('b'))));
        assert_eq!(parse("(a→b)∨c").unwrap().to_string(), "((a → b) ∨ c)");
    }

    #[test]
    fn test_parse_precedence() {
        // ¬ binds tighter than ∧, ∧ tighter than ∨, ∨ tighter than →.
        let f = parse("¬a ∧ b ∨ c → d").unwrap();
        assert_eq!(f.to_string(), "(((¬a ∧ b) ∨ c) → d)");
        let f = parse("a → b ∨ c ∧ ¬d").unwrap();
        assert_eq!(f.to_string(), "(a → (b ∨ (c ∧ ¬d)))");
    }

    #[test]
    fn test_parse_left_associative() {
        let f = parse("a → b → c").unwrap();
        assert_eq!(f, Formula::implies(Formula::implies(v('a'), v('b')), v('c')));
        let f = parse("a ∧ b ∧ c").unwrap();
        assert_eq!(f.to_string(), "((a ∧ b) ∧ c)");
        let f = parse("a ∨ b ∨ c").unwrap();
        assert_eq!(f.to_string(), "((a ∨ b) ∨ c)");
    }

    #[test]
    fn test_parse_parentheses_override() {
        let f = parse("a → (b → c)").unwrap();
        assert_eq!(f, Formula::implies(v('a'), Formula::implies(v('b'), v('c'))));
        assert_eq!(parse("((((a))))").unwrap(), v('a'));
    }

    #[test]
    fn test_parse_repeated_negation() {
        let f = parse("¬¬¬p").unwrap();
        assert_eq!(f.kind(), NodeKind::Not);
        assert_eq!(f.depth(), 4);
        assert_eq!(f.to_string(), "¬¬¬p");
        assert_eq!(parse("¬ ¬ p").unwrap(), Formula::not(Formula::not(v('p'))));
    }

    #[test]
    fn test_parse_deep_negation() {
        let depth = 100_000;
        let text = format!("{}p", NOT.repeat(depth));
        let f = parse(&text).unwrap();
        assert_eq!(f.depth(), depth + 1);
        assert_eq!(f.collect_variables(), vec!['p']);

        let mut inner = &f;
        for _ in 0..depth {
            assert_eq!(inner.kind(), NodeKind::Not);
            inner = inner.left().unwrap();
        }
        assert_eq!(inner.name(), Some('p'));

        let err = parse(&NOT.repeat(depth)).unwrap_err();
        assert_eq!(
            err,
            SyntaxError::UnexpectedToken {
                offset: depth * NOT.len(),
                found: Found::End
            }
        );
    }

    #[test]
    fn test_parse_case_sensitive() {
        let f = parse("a ∧ A").unwrap();
        assert_eq!(f.collect_variables(), vec!['a', 'A']);
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(
            parse(""),
            Err(SyntaxError::UnexpectedToken { offset: 0, found: Found::End })
        );
        assert_eq!(
            parse("   "),
            Err(SyntaxError::UnexpectedToken { offset: 3, found: Found::End })
        );
    }

    #[test]
    fn test_parse_bare_not() {
        assert_eq!(
            parse("¬"),
            Err(SyntaxError::UnexpectedToken {
                offset: NOT.len(),
                found: Found::End
            })
        );
    }

    #[test]
    fn test_parse_dangling_operator() {
        // `(` is consumed, then `∧` has no right operand.
        let err = parse("(a ∧").unwrap_err();
        assert!(matches!(err, SyntaxError::UnexpectedToken { found: Found::End, .. }));
        let err = parse("a ∨ ∨ b").unwrap_err();
        assert!(matches!(err, SyntaxError::UnexpectedToken { found: Found::Char('∨'), .. }));
    }

    #[test]
    fn test_parse_unclosed_paren() {
        assert_eq!(
            parse("(a"),
            Err(SyntaxError::UnclosedParen {
                open: 0,
                offset: 2,
                found: Found::End
            })
        );
        let err = parse("(a b)").unwrap_err();
        assert!(matches!(err, SyntaxError::UnclosedParen { found: Found::Char('b'), .. }));
    }

    #[test]
    fn test_parse_unmatched_close_paren() {
        let err = parse("a)").unwrap_err();
        assert_eq!(
            err,
            SyntaxError::TrailingInput {
                offset: 1,
                rest: ")".to_string()
            }
        );
    }

    #[test]
    fn test_parse_trailing_characters() {
        let err = parse("a b").unwrap_err();
        assert_eq!(
            err,
            SyntaxError::TrailingInput {
                offset: 2,
                rest: "b".to_string()
            }
        );
        assert!(matches!(parse("ab"), Err(SyntaxError::TrailingInput { offset: 1, .. })));
    }

    #[test]
    fn test_parse_unknown_symbols() {
        for text in ["&", "a & b", "1", "a ⊕ b", "é", "!a"] {
            assert!(parse(text).is_err(), "expected error for {:?}", text);
        }
        let err = parse("é").unwrap_err();
        assert_eq!(err.offset(), 0);
        assert_eq!(err.to_string(), "unexpected token 'é' at offset 0");
    }

    #[test]
    fn test_display_round_trip() {
        for text in [
            "a",
            "¬(a ∧ ¬a)",
            "a → b → c",
            "(p ∨ q) ∧ ¬(r → p)",
            "¬¬(x ∨ ¬y) → z ∧ x",
        ] {
            let f = parse(text).unwrap();
            let g = parse(&f.to_string()).unwrap();
            assert_eq!(f, g, "round trip of {:?}", text);
        }
    }

    #[test]
    fn test_from_str() {
        let f: Formula = "p → q".parse().unwrap();
        assert_eq!(f, Formula::implies(v('p'), v('q')));
        assert!("p →".parse::<Formula>().is_err());
    }
}
