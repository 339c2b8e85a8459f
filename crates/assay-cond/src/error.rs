use thiserror::Error;

use crate::token::Operator;

/// Errors raised while lexing or compiling an edit condition.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("EditCondition is empty")]
    Empty,

    #[error("unexpected character '{found}' at {position}")]
    UnexpectedCharacter { found: char, position: usize },

    #[error("unterminated quoted property name starting at {position}")]
    UnterminatedQuote { position: usize },

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("EditCondition contains single colon in property name \"{0}\", expected double colons.")]
    SingleColon(String),

    #[error("EditCondition contained double colon at start of property name \"{0}\", expected enum type.")]
    MissingEnumType(String),

    #[error("EditCondition contained double colon at end of property name \"{0}\", expected enum value.")]
    MissingEnumValue(String),

    #[error("expected an operand at {position}")]
    ExpectedOperand { position: usize },

    #[error("unexpected '{token}' at {position}")]
    UnexpectedToken { token: String, position: usize },

    #[error("missing ')' for '(' at {position}")]
    UnclosedGroup { position: usize },
}

/// Errors raised while evaluating a compiled edit condition against a context.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("EditCondition attempted to use an invalid operand \"{0}\".")]
    InvalidOperand(String),

    #[error("EditCondition attempted to use an invalid operand \"{0}\" (type error).")]
    InvalidOperandType(String),

    #[error("EditCondition attempted to use an invalid operand \"{0}\" (value error).")]
    InvalidOperandValue(String),

    #[error("EditCondition attempted to compare operands of different types: \"{0}\" and \"{1}\".")]
    TypeMismatch(String, String),

    #[error("EditCondition attempted to use an invalid enum value \"{enum_type}::{value}\".")]
    InvalidEnumValue { enum_type: String, value: String },

    #[error("EditCondition does not support '{left} {op} {right}'")]
    UnsupportedOperator {
        op: Operator,
        left: &'static str,
        right: &'static str,
    },

    #[error("EditCondition does not support '{op}' on {operand}")]
    UnsupportedUnary { op: Operator, operand: &'static str },

    #[error("EditCondition did not produce a boolean (got {0})")]
    NotBoolean(String),

    #[error("EditCondition expression is malformed")]
    Malformed,
}
