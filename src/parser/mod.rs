//! Recursive-descent parser over the type-aware lexer.
//!
//! Grammar, lowest to highest precedence (chained AND/OR associate to
//! the right):
//!
//! ```text
//! expression := logical_or
//! logical_or := logical_and ( OR logical_or )?
//! logical_and:= relational ( AND logical_and )?
//! relational := (EQ|NE|GT|LT|GE|LE) literal
//!             | BETWEEN literal (AND|...) literal
//!             | unary
//! unary      := NOT sequence | LIKE literal | sequence
//! sequence   := primary ( primary )*          -- juxtaposition joins with AND
//! primary    := '(' expression ')' | singular
//! singular   := literal ( '...' literal )?
//! ```
//!
//! Bare literals are wrapped by type: numbers, booleans, money and NULL
//! compare exactly, words and strings become substring (LIKE) matches,
//! and partial-precision date/time literals widen into the half-open
//! range covering their whole calendar unit. The relational forms widen
//! datetime operands the same way, so `> 2006` excludes all of 2006 and
//! `!= 12/31/2006` excludes the whole day.


use crate::ast::{CompareOp, Expr, FieldType, JoinOp, Literal, LiteralOp};
use crate::clock::Clock;
use crate::error::{QueryError, QueryResult};
use crate::lexer::{Lexer, Token};

/// Parser for one field's query string.
///
/// Cheap to construct; the schema builds one per field per evaluation.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    field_type: FieldType,
    default_join_op: JoinOp,
    default_literal_op: LiteralOp,
    clock: Clock,
    keywords: Vec<String>,
}

impl Parser {
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            ..Self::default()
        }
    }

    /// Use the given reference clock for relative date keywords.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// The operator implicitly inserted between juxtaposed literals.
    pub fn with_default_join_op(mut self, op: JoinOp) -> Self {
        self.default_join_op = op;
        self
    }

    /// The operator implicitly applied to bare string/word literals.
    pub fn with_default_literal_op(mut self, op: LiteralOp) -> Self {
        self.default_literal_op = op;
        self
    }

    /// Free-text terms collected during the last successful parse.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Parse a query string into an AST. Blank input is `Ok(None)`;
    /// leftover input after a complete expression is a syntax error.
    pub fn parse(&mut self, input: &str) -> QueryResult<Option<Expr>> {
        let mut stream = TokenStream::new(Lexer::new(input, self.field_type, self.clock));

        let expr = if stream.peek()?.is_some() {
            Some(self.parse_expression(&mut stream)?)
        } else {
            None
        };

        if let Some(extra) = stream.peek()? {
            return Err(QueryError::syntax(format!(
                "extra characters for {} field at {}",
                self.field_type, extra
            )));
        }

        self.keywords = stream.into_keywords();
        Ok(expr)
    }

    fn parse_expression(&mut self, s: &mut TokenStream<'_>) -> QueryResult<Expr> {
        self.parse_logical_or(s)
    }

    fn parse_logical_or(&mut self, s: &mut TokenStream<'_>) -> QueryResult<Expr> {
        let left = self.parse_logical_and(s)?;
        if matches!(s.peek()?, Some(Token::Or)) {
            s.read()?;
            let right = self.parse_logical_or(s)?;
            return Ok(Expr::or(left, right));
        }
        Ok(left)
    }

    fn parse_logical_and(&mut self, s: &mut TokenStream<'_>) -> QueryResult<Expr> {
        let left = self.parse_relational(s)?;
        if matches!(s.peek()?, Some(Token::And)) {
            s.read()?;
            let right = self.parse_logical_and(s)?;
            return Ok(Expr::and(left, right));
        }
        Ok(left)
    }

    fn parse_relational(&mut self, s: &mut TokenStream<'_>) -> QueryResult<Expr> {
        match s.peek()?.cloned() {
            Some(Token::Eq) => {
                s.read()?;
                ranged_eq(self.parse_literal(s)?)
            }
            Some(Token::Ne) => {
                s.read()?;
                ranged_ne(self.parse_literal(s)?)
            }
            Some(Token::Gt) => {
                s.read()?;
                ranged_gt(self.parse_literal(s)?)
            }
            Some(Token::Lt) => {
                s.read()?;
                Ok(Expr::Compare(CompareOp::Lt, self.parse_literal(s)?))
            }
            Some(Token::Ge) => {
                s.read()?;
                Ok(Expr::Compare(CompareOp::Ge, self.parse_literal(s)?))
            }
            Some(Token::Le) => {
                s.read()?;
                ranged_le(self.parse_literal(s)?)
            }
            Some(Token::Between) => {
                s.read()?;
                let low = self.parse_literal_token(s)?;
                match s.read()? {
                    Some(Token::And) | Some(Token::Ellipsis) => {}
                    Some(other) => {
                        return Err(QueryError::syntax(format!(
                            "expected AND or ... in BETWEEN, found {other}"
                        )))
                    }
                    None => {
                        return Err(QueryError::syntax(
                            "expected AND or ... in BETWEEN, found end of input",
                        ))
                    }
                }
                let high = self.parse_literal_token(s)?;
                // The bounds must come from the same literal family:
                // words and strings mix, datetime precisions mix,
                // everything else must repeat its own kind.
                if Family::of(&high) != Family::of(&low) {
                    return Err(QueryError::syntax(format!(
                        "expected {} value in BETWEEN, found {high}",
                        Family::of(&low)
                    )));
                }
                Ok(Expr::Between(to_literal(low)?, to_literal(high)?))
            }
            _ => self.parse_unary(s),
        }
    }

    fn parse_unary(&mut self, s: &mut TokenStream<'_>) -> QueryResult<Expr> {
        match s.peek()? {
            Some(Token::Not) => {
                s.read()?;
                Ok(Expr::not(self.parse_sequence(s)?))
            }
            Some(Token::Like) => {
                s.read()?;
                let token = self.parse_literal_token(s)?;
                Ok(Expr::Like(token.literal_text().unwrap_or_default()))
            }
            _ => self.parse_sequence(s),
        }
    }

    fn parse_sequence(&mut self, s: &mut TokenStream<'_>) -> QueryResult<Expr> {
        let mut expr = self.parse_primary(s)?;
        while s.peek()?.map_or(false, Token::is_literal) {
            let next = self.parse_primary(s)?;
            expr = Expr::join(self.default_join_op, expr, next);
        }
        Ok(expr)
    }

    fn parse_primary(&mut self, s: &mut TokenStream<'_>) -> QueryResult<Expr> {
        if matches!(s.peek()?, Some(Token::ParenOpen)) {
            s.read()?;
            let expr = self.parse_expression(s)?;
            match s.read()? {
                Some(Token::ParenClose) => Ok(expr),
                Some(other) => Err(QueryError::syntax(format!("expected ), found {other}"))),
                None => Err(QueryError::syntax("expected ), found end of input")),
            }
        } else {
            self.parse_singular(s)
        }
    }

    fn parse_singular(&mut self, s: &mut TokenStream<'_>) -> QueryResult<Expr> {
        let first = self.parse_literal_token(s)?;

        if matches!(s.peek()?, Some(Token::Ellipsis)) {
            s.read()?;
            let second = self.parse_literal_token(s)?;
            return Ok(Expr::Between(to_literal(first)?, to_literal(second)?));
        }

        match to_literal(first.clone())? {
            // Numericals match exact.
            lit @ (Literal::Null
            | Literal::Number(_)
            | Literal::Boolean(_)
            | Literal::Money(_)) => Ok(Expr::Compare(CompareOp::Eq, lit)),
            // Free text is usually inexact, so the default literal op
            // (substring match) applies.
            lit @ (Literal::Str(_) | Literal::Word(_)) => match self.default_literal_op {
                LiteralOp::Like => Ok(Expr::Like(first.literal_text().unwrap_or_default())),
                LiteralOp::Eq => Ok(Expr::Compare(CompareOp::Eq, lit)),
            },
            // A date should match every value inside it, however much
            // precision the column stores, so it widens to a range.
            Literal::DateTime(dt) => Ok(Expr::Range(
                Literal::DateTime(dt),
                Literal::DateTime(dt.plus_one()?),
            )),
        }
    }

    fn parse_literal(&mut self, s: &mut TokenStream<'_>) -> QueryResult<Literal> {
        let token = self.parse_literal_token(s)?;
        to_literal(token)
    }

    fn parse_literal_token(&mut self, s: &mut TokenStream<'_>) -> QueryResult<Token> {
        match s.read()? {
            Some(token) if token.is_literal() => Ok(token),
            Some(token) => Err(QueryError::syntax(format!("unexpected {token}"))),
            None => Err(QueryError::syntax("unexpected end of input")),
        }
    }
}

/// 1-token lookahead buffer over the lexer.
struct TokenStream<'a> {
    lexer: Lexer<'a>,
    peeked: Option<Option<Token>>,
}

impl<'a> TokenStream<'a> {
    fn new(lexer: Lexer<'a>) -> Self {
        Self {
            lexer,
            peeked: None,
        }
    }

    fn peek(&mut self) -> QueryResult<Option<&Token>> {
        if self.peeked.is_none() {
            self.peeked = Some(self.lexer.next_token()?);
        }
        Ok(self.peeked.as_ref().and_then(Option::as_ref))
    }

    fn read(&mut self) -> QueryResult<Option<Token>> {
        match self.peeked.take() {
            Some(token) => Ok(token),
            None => self.lexer.next_token(),
        }
    }

    fn into_keywords(self) -> Vec<String> {
        self.lexer.into_keywords()
    }
}

fn to_literal(token: Token) -> QueryResult<Literal> {
    match token {
        Token::Null => Ok(Literal::Null),
        Token::Str { text, .. } => Ok(Literal::Str(text)),
        Token::Word { text, .. } => Ok(Literal::Word(text)),
        Token::Number { value, .. } => Ok(Literal::Number(value)),
        Token::Boolean { value, .. } => Ok(Literal::Boolean(value)),
        Token::Money { value, .. } => Ok(Literal::Money(value)),
        Token::DateTime { value, .. } => Ok(Literal::DateTime(value)),
        other => Err(QueryError::syntax(format!("unexpected {other}"))),
    }
}

/// Literal families for BETWEEN bound compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Null,
    Text,
    Number,
    Boolean,
    Money,
    Datetime,
}

impl Family {
    fn of(token: &Token) -> Self {
        match token {
            Token::Str { .. } | Token::Word { .. } => Self::Text,
            Token::Number { .. } => Self::Number,
            Token::Boolean { .. } => Self::Boolean,
            Token::Money { .. } => Self::Money,
            Token::DateTime { .. } => Self::Datetime,
            _ => Self::Null,
        }
    }
}

impl std::fmt::Display for Family {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Null => "NULL",
            Self::Text => "text",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Money => "money",
            Self::Datetime => "datetime",
        };
        write!(f, "{name}")
    }
}

// ------------------------------------------------------------------
// Ranged-comparison widening for partial-precision datetimes.
//
// "= 2006" must cover all of 2006, "> 2006" must exclude all of it, and
// "!= 12/31/2006" must reject the whole day. Non-datetime literals pass
// through with the plain operator.
// ------------------------------------------------------------------

fn ranged_eq(lit: Literal) -> QueryResult<Expr> {
    match lit {
        Literal::DateTime(dt) => Ok(Expr::Range(
            Literal::DateTime(dt),
            Literal::DateTime(dt.plus_one()?),
        )),
        other => Ok(Expr::Compare(CompareOp::Eq, other)),
    }
}

fn ranged_ne(lit: Literal) -> QueryResult<Expr> {
    match lit {
        Literal::DateTime(dt) => Ok(Expr::or(
            Expr::Compare(CompareOp::Lt, Literal::DateTime(dt)),
            Expr::Compare(CompareOp::Ge, Literal::DateTime(dt.plus_one()?)),
        )),
        other => Ok(Expr::Compare(CompareOp::Ne, other)),
    }
}

fn ranged_gt(lit: Literal) -> QueryResult<Expr> {
    match lit {
        Literal::DateTime(dt) => Ok(Expr::Compare(
            CompareOp::Ge,
            Literal::DateTime(dt.plus_one()?),
        )),
        other => Ok(Expr::Compare(CompareOp::Gt, other)),
    }
}

fn ranged_le(lit: Literal) -> QueryResult<Expr> {
    use crate::datetime::Precision;
    match lit {
        // A second-precision literal is already as fine as the column;
        // nothing to widen over.
        Literal::DateTime(dt) if dt.precision != Precision::Second => Ok(Expr::Compare(
            CompareOp::Lt,
            Literal::DateTime(dt.plus_one()?),
        )),
        other => Ok(Expr::Compare(CompareOp::Le, other)),
    }
}
