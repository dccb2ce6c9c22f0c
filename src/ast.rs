//! Abstract syntax tree for parsed field queries.
//!
//! The parser guarantees the shape the generator relies on: comparison,
//! between, range and like nodes hold `Literal` values directly, never
//! nested expressions, so the generator can match exhaustively without a
//! runtime invariant check.

use serde::{Deserialize, Serialize};

use crate::datetime::DateTimePartial;
use crate::money::Money;

/// The semantic type declared for a field. Governs which lexing rules
/// apply to that field's input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    String,
    Number,
    Boolean,
    Money,
    Datetime,
}

impl FieldType {
    /// Normalize an external column type name as reported by a table
    /// description (`text` → string, `integer` → number, `date` →
    /// datetime, …). Unknown names fall back to string, the least
    /// surprising lexing mode.
    pub fn from_sql_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "string" | "text" | "char" | "varchar" => Self::String,
            "number" | "integer" | "int" | "bigint" | "smallint" | "float" | "double"
            | "decimal" | "numeric" => Self::Number,
            "boolean" | "bool" => Self::Boolean,
            "money" | "currency" => Self::Money,
            "datetime" | "date" | "time" | "timestamp" => Self::Datetime,
            _ => Self::String,
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Money => "money",
            Self::Datetime => "datetime",
        };
        write!(f, "{name}")
    }
}

/// A numeric literal, kept integral when the user wrote an integer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
        }
    }
}

/// A literal operand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Null,
    /// Quoted string, backslash escapes already decoded.
    Str(String),
    /// Bare unquoted word.
    Word(String),
    Number(Number),
    Boolean(bool),
    Money(Money),
    DateTime(DateTimePartial),
}

/// Comparison operators as they appear in `Expr::Compare`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
}

/// The operator implicitly joining juxtaposed literals (`foo bar`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinOp {
    #[default]
    And,
    Or,
}

/// The operator implicitly applied to bare string/word literals.
/// Substring matching is the intuitive default for free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LiteralOp {
    #[default]
    Like,
    Eq,
}

/// A parsed boolean predicate over one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Compare(CompareOp, Literal),
    /// Inclusive range, from an explicit `BETWEEN a AND b` / `a ... b`.
    Between(Literal, Literal),
    /// Half-open range `[low, high)`, from widening a partial-precision
    /// date/time literal.
    Range(Literal, Literal),
    /// Substring match; the pattern escaping happens at generation time.
    Like(String),
}

impl Expr {
    pub fn not(expr: Expr) -> Self {
        Self::Not(Box::new(expr))
    }

    pub fn and(left: Expr, right: Expr) -> Self {
        Self::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Expr, right: Expr) -> Self {
        Self::Or(Box::new(left), Box::new(right))
    }

    pub fn join(op: JoinOp, left: Expr, right: Expr) -> Self {
        match op {
            JoinOp::And => Self::and(left, right),
            JoinOp::Or => Self::or(left, right),
        }
    }
}
