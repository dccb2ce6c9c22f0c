//! SQL fragment renderer.
//!
//! Walks an AST and emits a boolean predicate over one target column
//! expression, either with literals inlined (quoted and escaped) or with
//! `?` placeholders and an ordered bound-value list.

use serde::{Deserialize, Serialize};

use crate::ast::{CompareOp, Expr, Literal, Number};

/// A value bound to a placeholder, in left-to-right tree order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SqlValue {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

/// Renders one field's AST against one target column expression.
pub struct Generator {
    target: String,
    values_inline: bool,
    sql: String,
    values: Vec<SqlValue>,
}

impl Generator {
    /// An inlining generator: literals appear quoted in the fragment.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            values_inline: true,
            sql: String::new(),
            values: Vec::new(),
        }
    }

    /// A placeholder generator: literals render as `?` and are collected
    /// for retrieval through [`Generator::values`].
    pub fn with_placeholders(target: impl Into<String>) -> Self {
        Self {
            values_inline: false,
            ..Self::new(target)
        }
    }

    /// Render an AST into a SQL fragment. `None` in, `None` out.
    /// Rendering is a pure walk; the same AST always yields the same text.
    pub fn sql(&mut self, expr: Option<&Expr>) -> Option<String> {
        self.sql.clear();
        self.values.clear();
        let expr = expr?;
        self.emit_expr(expr);
        Some(self.sql.clone())
    }

    /// Values bound during the last [`Generator::sql`] call, in
    /// placeholder order.
    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    fn emit_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Not(inner) => {
                self.emit("NOT (");
                self.emit_expr(inner);
                self.emit(")");
            }
            Expr::And(left, right) => self.emit_pair("AND", left, right),
            Expr::Or(left, right) => self.emit_pair("OR", left, right),
            Expr::Compare(op, value) => {
                let target = self.target.clone();
                self.emit("(");
                self.emit(&target);
                self.emit(" ");
                self.emit(op_sql(*op, value));
                self.emit(" ");
                self.emit_value(value);
                self.emit(")");
            }
            Expr::Between(low, high) => self.emit_bounds(low, ">=", high, "<="),
            Expr::Range(low, high) => self.emit_bounds(low, ">=", high, "<"),
            Expr::Like(text) => {
                let target = self.target.clone();
                self.emit("(");
                self.emit(&target);
                self.emit(" LIKE ");
                let pattern = like_pattern(text);
                if self.values_inline {
                    // The backslashes just inserted are the escape
                    // mechanism; quoting must not escape them again.
                    let quoted = quote(&pattern, false);
                    self.emit(&quoted);
                } else {
                    self.emit("?");
                    self.values.push(SqlValue::Text(pattern));
                }
                self.emit(")");
            }
        }
    }

    fn emit_pair(&mut self, op: &str, left: &Expr, right: &Expr) {
        self.emit("(");
        self.emit_expr(left);
        self.emit(" ");
        self.emit(op);
        self.emit(" ");
        self.emit_expr(right);
        self.emit(")");
    }

    fn emit_bounds(&mut self, low: &Literal, low_op: &str, high: &Literal, high_op: &str) {
        let target = self.target.clone();
        self.emit("((");
        self.emit(&target);
        self.emit(" ");
        self.emit(low_op);
        self.emit(" ");
        self.emit_value(low);
        self.emit(") AND (");
        self.emit(&target);
        self.emit(" ");
        self.emit(high_op);
        self.emit(" ");
        self.emit_value(high);
        self.emit("))");
    }

    fn emit_value(&mut self, value: &Literal) {
        let simple = to_sql_value(value);
        if self.values_inline {
            let text = match &simple {
                SqlValue::Null => "NULL".to_string(),
                SqlValue::Int(n) => n.to_string(),
                SqlValue::Float(n) => n.to_string(),
                SqlValue::Text(s) => quote(s, true),
            };
            self.emit(&text);
        } else {
            self.emit("?");
            self.values.push(simple);
        }
    }

    fn emit(&mut self, raw: &str) {
        self.sql.push_str(raw);
    }
}

fn op_sql(op: CompareOp, value: &Literal) -> &'static str {
    // NULL comparisons use IS / IS NOT
    if matches!(value, Literal::Null) {
        match op {
            CompareOp::Eq => return "IS",
            CompareOp::Ne => return "IS NOT",
            _ => {}
        }
    }
    match op {
        CompareOp::Lt => "<",
        CompareOp::Gt => ">",
        CompareOp::Le => "<=",
        CompareOp::Ge => ">=",
        CompareOp::Eq => "=",
        CompareOp::Ne => "<>",
    }
}

/// Reduce a literal to the scalar that goes into the SQL (or the bound
/// value list): booleans as `1`/`0`, money as integer subunits, datetime
/// as its fixed-width string form.
fn to_sql_value(value: &Literal) -> SqlValue {
    match value {
        Literal::Null => SqlValue::Null,
        Literal::Str(text) | Literal::Word(text) => SqlValue::Text(text.clone()),
        Literal::Number(Number::Int(n)) => SqlValue::Int(*n),
        Literal::Number(Number::Float(n)) => SqlValue::Float(*n),
        Literal::Boolean(b) => SqlValue::Int(i64::from(*b)),
        Literal::Money(m) => SqlValue::Int(m.subunits()),
        Literal::DateTime(dt) => SqlValue::Text(dt.to_sql_string()),
    }
}

/// Escape `%`, `_` and `\` in the search text, then widen to a
/// substring pattern.
fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Single-quote a string, backslash-escaping `'` (and `\` unless the
/// caller already inserted intentional escapes).
fn quote(text: &str, escape_backslash: bool) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('\'');
    for c in text.chars() {
        match c {
            '\'' => {
                quoted.push('\\');
                quoted.push(c);
            }
            '\\' if escape_backslash => {
                quoted.push('\\');
                quoted.push(c);
            }
            _ => quoted.push(c),
        }
    }
    quoted.push('\'');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::FieldType;
    use crate::clock::Clock;
    use crate::parser::Parser;
    use pretty_assertions::assert_eq;

    fn render(field_type: FieldType, input: &str) -> String {
        let clock = Clock::fixed(
            chrono::NaiveDate::from_ymd_opt(2006, 2, 4)
                .unwrap()
                .and_hms_opt(0, 30, 15)
                .unwrap(),
        );
        let expr = Parser::new(field_type)
            .with_clock(clock)
            .parse(input)
            .unwrap();
        let mut generator = Generator::new("t.c");
        generator.sql(expr.as_ref()).unwrap()
    }

    #[test]
    fn test_none_in_none_out() {
        let mut generator = Generator::new("t.c");
        assert_eq!(generator.sql(None), None);
    }

    #[test]
    fn test_exact_number() {
        assert_eq!(render(FieldType::Number, "500"), "(t.c = 500)");
        assert_eq!(render(FieldType::Number, ">500"), "(t.c > 500)");
        assert_eq!(render(FieldType::Number, "1.25"), "(t.c = 1.25)");
    }

    #[test]
    fn test_word_becomes_like() {
        assert_eq!(render(FieldType::String, "foo"), "(t.c LIKE '%foo%')");
    }

    #[test]
    fn test_like_escapes_wildcards() {
        assert_eq!(
            render(FieldType::String, "LIKE \"95%\""),
            "(t.c LIKE '%95\\%%')"
        );
        assert_eq!(
            render(FieldType::String, "LIKE \"UNDER_SCORE\""),
            "(t.c LIKE '%UNDER\\_SCORE%')"
        );
        assert_eq!(
            render(FieldType::String, "LIKE \"back\\\\slash\""),
            "(t.c LIKE '%back\\\\slash%')"
        );
    }

    #[test]
    fn test_quote_escaping() {
        assert_eq!(
            render(FieldType::String, "\"it's\""),
            "(t.c LIKE '%it\\'s%')"
        );
    }

    #[test]
    fn test_null_uses_is() {
        assert_eq!(render(FieldType::Number, "NULL"), "(t.c IS NULL)");
        assert_eq!(render(FieldType::Number, "NOT NULL"), "NOT ((t.c IS NULL))");
        assert_eq!(render(FieldType::Number, "!= NULL"), "(t.c IS NOT NULL)");
    }

    #[test]
    fn test_boolean_renders_as_tinyint() {
        assert_eq!(render(FieldType::Boolean, "true"), "(t.c = 1)");
        assert_eq!(render(FieldType::Boolean, "false"), "(t.c = 0)");
    }

    #[test]
    fn test_money_renders_subunits() {
        assert_eq!(render(FieldType::Money, "1,234.56"), "(t.c = 123456)");
        assert_eq!(
            render(FieldType::Money, "LESS THAN $123.01"),
            "(t.c < 12301)"
        );
    }

    #[test]
    fn test_datetime_range() {
        assert_eq!(
            render(FieldType::Datetime, "2006"),
            "((t.c >= '2006-01-01 00:00:00') AND (t.c < '2007-01-01 00:00:00'))"
        );
        assert_eq!(
            render(FieldType::Datetime, "12/2006"),
            "((t.c >= '2006-12-01 00:00:00') AND (t.c < '2007-01-01 00:00:00'))"
        );
    }

    #[test]
    fn test_datetime_ne_splits_into_or() {
        assert_eq!(
            render(FieldType::Datetime, "!= 12/31/2006"),
            "((t.c < '2006-12-31 00:00:00') OR (t.c >= '2007-01-01 00:00:00'))"
        );
    }

    #[test]
    fn test_between_keeps_bounds_inclusive() {
        assert_eq!(
            render(FieldType::Datetime, "BETWEEN 2/4/2006 AND 2007"),
            "((t.c >= '2006-02-04 00:00:00') AND (t.c <= '2007-01-01 00:00:00'))"
        );
    }

    #[test]
    fn test_and_or_nesting() {
        assert_eq!(
            render(FieldType::String, "foo AND bar OR baz"),
            "(((t.c LIKE '%foo%') AND (t.c LIKE '%bar%')) OR (t.c LIKE '%baz%'))"
        );
    }

    #[test]
    fn test_placeholders_collect_values_in_order() {
        let expr = Parser::new(FieldType::Number)
            .parse("BETWEEN 1 AND 5")
            .unwrap();
        let mut generator = Generator::with_placeholders("t.c");
        let sql = generator.sql(expr.as_ref()).unwrap();
        assert_eq!(sql, "((t.c >= ?) AND (t.c <= ?))");
        assert_eq!(generator.values(), [SqlValue::Int(1), SqlValue::Int(5)]);
    }

    #[test]
    fn test_placeholder_like_binds_pattern() {
        let expr = Parser::new(FieldType::String).parse("foo").unwrap();
        let mut generator = Generator::with_placeholders("t.c");
        let sql = generator.sql(expr.as_ref()).unwrap();
        assert_eq!(sql, "(t.c LIKE ?)");
        assert_eq!(generator.values(), [SqlValue::Text("%foo%".into())]);
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let expr = Parser::new(FieldType::String)
            .parse("foo AND (bar OR baz)")
            .unwrap();
        let mut generator = Generator::new("t.c");
        let first = generator.sql(expr.as_ref()).unwrap();
        let second = generator.sql(expr.as_ref()).unwrap();
        assert_eq!(first, second);
    }
}
