//! Tokens of the edit-condition language.

use std::fmt;

/// Operators, in lexing priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Equal,
    NotEqual,
    LessEqual,
    Less,
    GreaterEqual,
    Greater,
    Not,
    And,
    Or,
    Add,
    Subtract,
    Multiply,
    Divide,
    BitwiseAnd,
}

impl Operator {
    /// Every operator, longest symbols first where they share a prefix.
    pub const ALL: [Operator; 14] = [
        Operator::Equal,
        Operator::NotEqual,
        Operator::LessEqual,
        Operator::Less,
        Operator::GreaterEqual,
        Operator::Greater,
        Operator::Not,
        Operator::And,
        Operator::Or,
        Operator::Add,
        Operator::Subtract,
        Operator::Multiply,
        Operator::Divide,
        Operator::BitwiseAnd,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::LessEqual => "<=",
            Operator::Less => "<",
            Operator::GreaterEqual => ">=",
            Operator::Greater => ">",
            Operator::Not => "!",
            Operator::And => "&&",
            Operator::Or => "||",
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::BitwiseAnd => "&",
        }
    }

    /// Binary precedence; lower binds tighter. `None` for the unary `!`.
    pub fn precedence(self) -> Option<u8> {
        match self {
            Operator::And | Operator::Or => Some(4),
            Operator::Equal
            | Operator::NotEqual
            | Operator::Less
            | Operator::LessEqual
            | Operator::Greater
            | Operator::GreaterEqual => Some(3),
            Operator::BitwiseAnd | Operator::Add | Operator::Subtract => Some(2),
            Operator::Multiply | Operator::Divide => Some(1),
            Operator::Not => None,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Operator(Operator),
    OpenParen,
    CloseParen,
    Number(f64),
    Bool(bool),
    NullPtr,
    IndexNone,
    /// Property name, resolved against the context at evaluation time.
    Property(String),
    /// `EnumType::Value`, resolved at evaluation time.
    Enum { enum_type: String, value: String },
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Operator(op) => write!(f, "{op}"),
            TokenKind::OpenParen => f.write_str("("),
            TokenKind::CloseParen => f.write_str(")"),
            TokenKind::Number(n) => write!(f, "{n}"),
            TokenKind::Bool(b) => write!(f, "{b}"),
            TokenKind::NullPtr => f.write_str("nullptr"),
            TokenKind::IndexNone => f.write_str("INDEX_NONE"),
            TokenKind::Property(name) => f.write_str(name),
            TokenKind::Enum { enum_type, value } => write!(f, "{enum_type}::{value}"),
        }
    }
}

/// A token with its byte offset in the source string
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: usize,
}

impl Token {
    pub fn new(kind: TokenKind, position: usize) -> Self {
        Self { kind, position }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence_order() {
        assert!(Operator::Multiply.precedence() < Operator::Add.precedence());
        assert!(Operator::BitwiseAnd.precedence() < Operator::Equal.precedence());
        assert!(Operator::Less.precedence() < Operator::And.precedence());
        assert_eq!(Operator::And.precedence(), Operator::Or.precedence());
        assert_eq!(Operator::Not.precedence(), None);
    }

    #[test]
    fn test_display() {
        let token = TokenKind::Enum {
            enum_type: "ESimpleEnum".to_string(),
            value: "Two".to_string(),
        };
        assert_eq!(token.to_string(), "ESimpleEnum::Two");
        assert_eq!(TokenKind::Operator(Operator::NotEqual).to_string(), "!=");
    }
}
