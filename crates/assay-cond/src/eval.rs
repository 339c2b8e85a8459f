//! Operator jump table and postfix evaluation.

use std::collections::HashMap;
use std::fmt;

use log::debug;

use assay_model::value::INDEX_NONE;

use crate::context::EditConditionContext;
use crate::error::{EvalError, ParseError};
use crate::parser::EditConditionExpression;
use crate::token::{Operator, TokenKind};

/// A value on the evaluation stack.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Bool(bool),
    Number(f64),
    NullPtr,
    IndexNone,
    /// Unresolved property reference.
    Property(String),
    Enum { enum_type: String, value: String },
}

/// Shape of an operand, the key of the jump table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandKind {
    Bool,
    Number,
    NullPtr,
    IndexNone,
    Property,
    Enum,
}

impl OperandKind {
    pub fn name(self) -> &'static str {
        match self {
            OperandKind::Bool => "bool",
            OperandKind::Number => "number",
            OperandKind::NullPtr => "nullptr",
            OperandKind::IndexNone => "INDEX_NONE",
            OperandKind::Property => "property",
            OperandKind::Enum => "enum",
        }
    }
}

impl Operand {
    pub fn kind(&self) -> OperandKind {
        match self {
            Operand::Bool(_) => OperandKind::Bool,
            Operand::Number(_) => OperandKind::Number,
            Operand::NullPtr => OperandKind::NullPtr,
            Operand::IndexNone => OperandKind::IndexNone,
            Operand::Property(_) => OperandKind::Property,
            Operand::Enum { .. } => OperandKind::Enum,
        }
    }

    fn from_token(kind: &TokenKind) -> Option<Operand> {
        let operand = match kind {
            TokenKind::Number(n) => Operand::Number(*n),
            TokenKind::Bool(b) => Operand::Bool(*b),
            TokenKind::NullPtr => Operand::NullPtr,
            TokenKind::IndexNone => Operand::IndexNone,
            TokenKind::Property(name) => Operand::Property(name.clone()),
            TokenKind::Enum { enum_type, value } => Operand::Enum {
                enum_type: enum_type.clone(),
                value: value.clone(),
            },
            TokenKind::Operator(_) | TokenKind::OpenParen | TokenKind::CloseParen => return None,
        };
        Some(operand)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Bool(b) => write!(f, "{b}"),
            Operand::Number(n) => write!(f, "{n}"),
            Operand::NullPtr => f.write_str("nullptr"),
            Operand::IndexNone => f.write_str("INDEX_NONE"),
            Operand::Property(name) => f.write_str(name),
            Operand::Enum { enum_type, value } => write!(f, "{enum_type}::{value}"),
        }
    }
}

type Context<'c> = &'c dyn EditConditionContext;
type UnaryFn = fn(&Operand, Context<'_>) -> Result<Operand, EvalError>;
type BinaryFn = fn(Operator, &Operand, &Operand, Context<'_>) -> Result<Operand, EvalError>;

/// Handlers keyed by operator and operand kinds.
///
/// A combination with no entry is an evaluation error, never a fallback.
pub struct OperatorJumpTable {
    unary: HashMap<(Operator, OperandKind), UnaryFn>,
    binary: HashMap<(Operator, OperandKind, OperandKind), BinaryFn>,
}

impl Default for OperatorJumpTable {
    fn default() -> Self {
        Self::new()
    }
}

impl OperatorJumpTable {
    pub fn new() -> Self {
        let mut table = Self {
            unary: HashMap::new(),
            binary: HashMap::new(),
        };
        table.map_pointer_operators();
        table.map_boolean_operators();
        table.map_number_operators();
        table.map_enum_operators();
        table
    }

    fn map_unary(&mut self, op: Operator, operand: OperandKind, handler: UnaryFn) {
        self.unary.insert((op, operand), handler);
    }

    fn map_binary(&mut self, op: Operator, left: OperandKind, right: OperandKind, handler: BinaryFn) {
        self.binary.insert((op, left, right), handler);
    }

    fn map_pointer_operators(&mut self) {
        use OperandKind::*;
        for op in [Operator::Equal, Operator::NotEqual] {
            self.map_binary(op, Property, Property, properties_equal);
            self.map_binary(op, Property, NullPtr, property_is_null);
            self.map_binary(op, Property, IndexNone, property_is_index_none);
        }
        self.map_binary(Operator::BitwiseAnd, Property, Enum, bitwise_and);
    }

    fn map_boolean_operators(&mut self) {
        use OperandKind::*;
        self.map_unary(Operator::Not, Bool, not);
        self.map_unary(Operator::Not, Property, not);

        for op in [Operator::And, Operator::Or] {
            self.map_binary(op, Bool, Bool, logical);
            self.map_binary(op, Property, Bool, logical);
            self.map_binary(op, Bool, Property, logical);
            self.map_binary(op, Property, Property, logical);
        }
        // Property == Property is taken by the pointer/type-aware comparison.
        for op in [Operator::Equal, Operator::NotEqual] {
            self.map_binary(op, Bool, Bool, logical);
            self.map_binary(op, Property, Bool, logical);
            self.map_binary(op, Bool, Property, logical);
        }
    }

    fn map_number_operators(&mut self) {
        use OperandKind::*;
        for op in [Operator::Equal, Operator::NotEqual] {
            self.map_binary(op, Number, Number, numeric);
            self.map_binary(op, Property, Number, numeric);
            self.map_binary(op, Number, Property, numeric);
        }
        for op in [
            Operator::Greater,
            Operator::GreaterEqual,
            Operator::Less,
            Operator::LessEqual,
            Operator::Add,
            Operator::Subtract,
            Operator::Multiply,
            Operator::Divide,
        ] {
            self.map_binary(op, Number, Number, numeric);
            self.map_binary(op, Property, Number, numeric);
            self.map_binary(op, Number, Property, numeric);
            self.map_binary(op, Property, Property, numeric);
        }
    }

    fn map_enum_operators(&mut self) {
        use OperandKind::*;
        for op in [Operator::Equal, Operator::NotEqual] {
            self.map_binary(op, Enum, Enum, enums_equal);
            self.map_binary(op, Property, Enum, enum_property_equal);
            self.map_binary(op, Enum, Property, enum_property_equal);
        }
    }

    /// Run a compiled expression against a context.
    pub fn evaluate(
        &self,
        expression: &EditConditionExpression,
        context: &dyn EditConditionContext,
    ) -> Result<bool, EvalError> {
        let mut stack: Vec<Operand> = Vec::new();

        for token in &expression.tokens {
            if let Some(operand) = Operand::from_token(&token.kind) {
                stack.push(operand);
                continue;
            }
            let TokenKind::Operator(op) = token.kind else {
                return Err(EvalError::Malformed);
            };

            let result = if op == Operator::Not {
                let operand = stack.pop().ok_or(EvalError::Malformed)?;
                let handler = self.unary.get(&(op, operand.kind())).ok_or_else(|| {
                    EvalError::UnsupportedUnary {
                        op,
                        operand: operand.kind().name(),
                    }
                })?;
                handler(&operand, context)?
            } else {
                let right = stack.pop().ok_or(EvalError::Malformed)?;
                let left = stack.pop().ok_or(EvalError::Malformed)?;
                let handler = self
                    .binary
                    .get(&(op, left.kind(), right.kind()))
                    .ok_or_else(|| EvalError::UnsupportedOperator {
                        op,
                        left: left.kind().name(),
                        right: right.kind().name(),
                    })?;
                handler(op, &left, &right, context)?
            };
            stack.push(result);
        }

        let result = stack.pop().ok_or(EvalError::Malformed)?;
        if !stack.is_empty() {
            return Err(EvalError::Malformed);
        }
        match result {
            Operand::Bool(value) => Ok(value),
            // A trailing bare property is read as a bool.
            Operand::Property(name) => context
                .bool_value(&name)
                .ok_or(EvalError::InvalidOperand(name)),
            other => Err(EvalError::NotBoolean(other.to_string())),
        }
    }
}

/// Lexer, compiler and jump table bundled together.
///
/// Built once and shared; parsing is the expensive step, so callers should
/// keep the expressions they parse.
#[derive(Default)]
pub struct EditConditionParser {
    table: OperatorJumpTable,
}

impl EditConditionParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(&self, source: &str) -> Result<EditConditionExpression, ParseError> {
        let expression = EditConditionExpression::parse(source)?;
        debug!(
            "compiled edit condition '{source}' into {} tokens",
            expression.tokens.len()
        );
        Ok(expression)
    }

    pub fn evaluate(
        &self,
        expression: &EditConditionExpression,
        context: &dyn EditConditionContext,
    ) -> Result<bool, EvalError> {
        self.table.evaluate(expression, context)
    }
}

// ── Handlers ──

fn property_name(operand: &Operand) -> String {
    operand.to_string()
}

fn bool_of(operand: &Operand, context: Context<'_>) -> Result<bool, EvalError> {
    match operand {
        Operand::Bool(value) => Ok(*value),
        Operand::Property(name) => context
            .bool_value(name)
            .ok_or_else(|| EvalError::InvalidOperand(name.clone())),
        _ => Err(EvalError::Malformed),
    }
}

fn number_of(operand: &Operand, context: Context<'_>) -> Result<f64, EvalError> {
    match operand {
        Operand::Number(value) => Ok(*value),
        Operand::Property(name) => context
            .numeric_value(name)
            .ok_or_else(|| EvalError::InvalidOperand(name.clone())),
        _ => Err(EvalError::Malformed),
    }
}

fn not(operand: &Operand, context: Context<'_>) -> Result<Operand, EvalError> {
    Ok(Operand::Bool(!bool_of(operand, context)?))
}

fn logical(op: Operator, a: &Operand, b: &Operand, context: Context<'_>) -> Result<Operand, EvalError> {
    let a = bool_of(a, context)?;
    let b = bool_of(b, context)?;
    let value = match op {
        Operator::And => a && b,
        Operator::Or => a || b,
        Operator::Equal => a == b,
        Operator::NotEqual => a != b,
        _ => return Err(EvalError::Malformed),
    };
    Ok(Operand::Bool(value))
}

fn numeric(op: Operator, a: &Operand, b: &Operand, context: Context<'_>) -> Result<Operand, EvalError> {
    let a = number_of(a, context)?;
    let b = number_of(b, context)?;
    let result = match op {
        Operator::Equal => Operand::Bool(a == b),
        Operator::NotEqual => Operand::Bool(a != b),
        Operator::Greater => Operand::Bool(a > b),
        Operator::GreaterEqual => Operand::Bool(a >= b),
        Operator::Less => Operand::Bool(a < b),
        Operator::LessEqual => Operand::Bool(a <= b),
        Operator::Add => Operand::Number(a + b),
        Operator::Subtract => Operand::Number(a - b),
        Operator::Multiply => Operand::Number(a * b),
        Operator::Divide => Operand::Number(a / b),
        _ => return Err(EvalError::Malformed),
    };
    Ok(result)
}

fn negate_if(op: Operator, equal: bool) -> Operand {
    Operand::Bool(if op == Operator::NotEqual { !equal } else { equal })
}

fn enums_equal(op: Operator, a: &Operand, b: &Operand, _: Context<'_>) -> Result<Operand, EvalError> {
    Ok(negate_if(op, a == b))
}

fn enum_property_equal(
    op: Operator,
    a: &Operand,
    b: &Operand,
    context: Context<'_>,
) -> Result<Operand, EvalError> {
    let (property, enum_type, value) = match (a, b) {
        (Operand::Property(property), Operand::Enum { enum_type, value })
        | (Operand::Enum { enum_type, value }, Operand::Property(property)) => (property, enum_type, value),
        _ => return Err(EvalError::Malformed),
    };

    let type_name = context
        .type_name(property)
        .ok_or_else(|| EvalError::InvalidOperandType(property.clone()))?;
    if &type_name != enum_type {
        return Err(EvalError::TypeMismatch(
            property.clone(),
            format!("{enum_type}::{value}"),
        ));
    }
    let current = context
        .enum_value(property)
        .ok_or_else(|| EvalError::InvalidOperandValue(property.clone()))?;
    Ok(negate_if(op, &current == value))
}

/// Pointer identity when both are object references, otherwise a comparison
/// of same-typed bool, numeric or enum values.
fn properties_equal(op: Operator, a: &Operand, b: &Operand, context: Context<'_>) -> Result<Operand, EvalError> {
    let (a, b) = (property_name(a), property_name(b));

    if let (Some(pa), Some(pb)) = (context.object_value(&a), context.object_value(&b)) {
        return Ok(negate_if(op, pa == pb));
    }

    let type_a = context
        .type_name(&a)
        .ok_or_else(|| EvalError::InvalidOperand(a.clone()))?;
    let type_b = context
        .type_name(&b)
        .ok_or_else(|| EvalError::InvalidOperand(b.clone()))?;
    if type_a != type_b {
        return Err(EvalError::TypeMismatch(a, b));
    }

    if let (Some(va), Some(vb)) = (context.bool_value(&a), context.bool_value(&b)) {
        return Ok(negate_if(op, va == vb));
    }
    if let (Some(va), Some(vb)) = (context.numeric_value(&a), context.numeric_value(&b)) {
        return Ok(negate_if(op, va == vb));
    }
    if let (Some(va), Some(vb)) = (context.enum_value(&a), context.enum_value(&b)) {
        return Ok(negate_if(op, va == vb));
    }
    Err(EvalError::TypeMismatch(a, b))
}

fn property_is_null(op: Operator, a: &Operand, _: &Operand, context: Context<'_>) -> Result<Operand, EvalError> {
    let name = property_name(a);
    if context.type_name(&name).is_none() {
        return Err(EvalError::InvalidOperand(name));
    }
    let pointer = context
        .object_value(&name)
        .ok_or_else(|| EvalError::InvalidOperand(name.clone()))?;
    Ok(negate_if(op, pointer.is_none()))
}

fn property_is_index_none(
    op: Operator,
    a: &Operand,
    _: &Operand,
    context: Context<'_>,
) -> Result<Operand, EvalError> {
    let name = property_name(a);
    if context.type_name(&name).is_none() {
        return Err(EvalError::InvalidOperand(name));
    }
    let value = context
        .integer_value(&name)
        .ok_or_else(|| EvalError::InvalidOperand(name.clone()))?;
    Ok(negate_if(op, value == INDEX_NONE))
}

fn bitwise_and(_: Operator, a: &Operand, b: &Operand, context: Context<'_>) -> Result<Operand, EvalError> {
    let Operand::Enum { enum_type, value } = b else {
        return Err(EvalError::Malformed);
    };
    let mask = context
        .enum_member_value(enum_type, value)
        .ok_or_else(|| EvalError::InvalidEnumValue {
            enum_type: enum_type.clone(),
            value: value.clone(),
        })?;
    let name = property_name(a);
    let current = context
        .integer_value(&name)
        .ok_or(EvalError::InvalidOperand(name))?;
    Ok(Operand::Bool(current & mask != 0))
}
