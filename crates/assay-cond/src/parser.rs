//! Precedence-climbing compiler from tokens to a postfix token stream.

use crate::error::ParseError;
use crate::lexer::Lexer;
use crate::token::{Operator, Token, TokenKind};

/// Loosest binary precedence level.
const LOWEST_PRECEDENCE: u8 = 4;

/// A compiled edit condition: the source plus its tokens in postfix order.
///
/// Property names are kept as names and resolved on every evaluation, so one
/// expression can be evaluated against any number of instances.
#[derive(Debug, Clone, PartialEq)]
pub struct EditConditionExpression {
    pub source: String,
    pub tokens: Vec<Token>,
}

impl EditConditionExpression {
    /// Lex and compile a condition string.
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        let tokens = Lexer::new(source).tokenize()?;
        if tokens.is_empty() {
            return Err(ParseError::Empty);
        }
        let tokens = Parser::new(tokens, source.len()).compile()?;
        Ok(Self {
            source: source.to_string(),
            tokens,
        })
    }

    /// Names of every property the expression reads.
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().filter_map(|t| match &t.kind {
            TokenKind::Property(name) => Some(name.as_str()),
            _ => None,
        })
    }
}

/// Binary operators at the same level associate to the left; `!` binds
/// tighter than every binary operator.
struct Parser {
    tokens: Vec<Token>,
    current: usize,
    end: usize,
    output: Vec<Token>,
}

impl Parser {
    fn new(tokens: Vec<Token>, end: usize) -> Self {
        Self {
            output: Vec::with_capacity(tokens.len()),
            tokens,
            current: 0,
            end,
        }
    }

    fn compile(mut self) -> Result<Vec<Token>, ParseError> {
        self.binary(LOWEST_PRECEDENCE)?;
        if let Some(token) = self.tokens.get(self.current) {
            return Err(ParseError::UnexpectedToken {
                token: token.kind.to_string(),
                position: token.position,
            });
        }
        Ok(self.output)
    }

    /// Operand followed by any binary operators no looser than `limit`.
    fn binary(&mut self, limit: u8) -> Result<(), ParseError> {
        self.unary()?;
        while let Some(token) = self.tokens.get(self.current) {
            let TokenKind::Operator(op) = token.kind else {
                break;
            };
            let Some(precedence) = op.precedence() else {
                break;
            };
            if precedence > limit {
                break;
            }
            let operator = token.clone();
            self.current += 1;
            self.binary(precedence - 1)?;
            self.output.push(operator);
        }
        Ok(())
    }

    fn unary(&mut self) -> Result<(), ParseError> {
        let Some(token) = self.tokens.get(self.current).cloned() else {
            return Err(ParseError::ExpectedOperand { position: self.end });
        };
        self.current += 1;

        match token.kind {
            TokenKind::Operator(Operator::Not) => {
                self.unary()?;
                self.output.push(token);
            }
            TokenKind::OpenParen => {
                self.binary(LOWEST_PRECEDENCE)?;
                match self.tokens.get(self.current) {
                    Some(Token {
                        kind: TokenKind::CloseParen,
                        ..
                    }) => self.current += 1,
                    _ => {
                        return Err(ParseError::UnclosedGroup {
                            position: token.position,
                        })
                    }
                }
            }
            TokenKind::Operator(_) | TokenKind::CloseParen => {
                return Err(ParseError::ExpectedOperand {
                    position: token.position,
                });
            }
            _ => self.output.push(token),
        }
        Ok(())
    }
}
