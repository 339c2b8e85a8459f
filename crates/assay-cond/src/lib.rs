pub mod context;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod token;

pub use context::{EditConditionContext, InstanceContext};
pub use error::{EvalError, ParseError};
pub use eval::{EditConditionParser, Operand, OperatorJumpTable};
pub use parser::EditConditionExpression;
pub use token::{Operator, Token, TokenKind};
